//! Core data types for the marketsim backtester.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Share count. Signed so a ledger entry can represent a short position.
pub type Shares = i64;

/// Hour of the daily close every session is stamped with.
pub const MARKET_CLOSE_HOUR: u32 = 16;

/// Time of day every trading session is stamped with.
pub fn market_close() -> NaiveTime {
    NaiveTime::from_hms_opt(MARKET_CLOSE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Timestamp of the close of the session on `date`.
#[inline]
pub fn session_close(date: NaiveDate) -> NaiveDateTime {
    date.and_time(market_close())
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign applied to the share count: +1 for buys, -1 for sells.
    #[inline]
    pub fn sign(self) -> Shares {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    /// Only the exact literals `Buy` and `Sell` are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Buy" => Ok(Side::Buy),
            "Sell" => Ok(Side::Sell),
            other => Err(Error::data(format!("unknown order side '{other}'"))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("Buy"),
            Side::Sell => f.write_str("Sell"),
        }
    }
}

/// A single trade instruction, executed at the close of `date`.
///
/// Only [`Order::new`] builds one, so every order has a symbol and a
/// positive share count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    date: NaiveDate,
    symbol: String,
    side: Side,
    shares: u32,
}

impl Order {
    /// Create an order. The symbol must be non-empty and the share count
    /// positive.
    pub fn new(date: NaiveDate, symbol: impl Into<String>, side: Side, shares: u32) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(Error::data("order symbol is empty"));
        }
        if shares == 0 {
            return Err(Error::data(format!("order for {symbol} has zero shares")));
        }
        Ok(Self {
            date,
            symbol,
            side,
            shares,
        })
    }

    /// Session date the order executes on.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Execution timestamp (session close).
    pub fn timestamp(&self) -> NaiveDateTime {
        session_close(self.date)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Unsigned share count.
    pub fn shares(&self) -> u32 {
        self.shares
    }

    /// Share count with the side's sign applied.
    #[inline]
    pub fn signed_shares(&self) -> Shares {
        Shares::from(self.shares) * self.side.sign()
    }
}

/// One day of the valuation series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationPoint {
    /// Session date.
    pub date: NaiveDate,
    /// Cash plus marked-to-market holdings at the close.
    pub equity: f64,
}

impl ValuationPoint {
    /// Split into the `(year, month, day, equity)` output record.
    pub fn to_record(&self) -> (i32, u32, u32, f64) {
        (self.date.year(), self.date.month(), self.date.day(), self.equity)
    }
}
