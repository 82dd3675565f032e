//! Position tracking for the order replay.
//!
//! Tracks signed share counts per symbol. A symbol that is not in the
//! ledger holds zero shares; negative counts are short positions.

use marketsim_core::{Order, Shares};
use std::collections::BTreeMap;

/// Symbol -> signed share count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionLedger {
    shares: BTreeMap<String, Shares>,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current share count for `symbol` (zero when absent).
    pub fn shares(&self, symbol: &str) -> Shares {
        self.shares.get(symbol).copied().unwrap_or(0)
    }

    /// Whether `symbol` is currently short.
    pub fn is_short(&self, symbol: &str) -> bool {
        self.shares(symbol) < 0
    }

    /// Apply an order's signed share count and return the new count.
    ///
    /// Sells past zero open or extend a short; flat positions are dropped
    /// from the ledger.
    pub fn apply(&mut self, order: &Order) -> Shares {
        let next = self.shares(order.symbol()) + order.signed_shares();
        if next == 0 {
            self.shares.remove(order.symbol());
        } else {
            self.shares.insert(order.symbol().to_string(), next);
        }
        next
    }

    /// Non-zero positions in symbol order.
    pub fn open_positions(&self) -> impl Iterator<Item = (&str, Shares)> {
        self.shares.iter().map(|(symbol, &shares)| (symbol.as_str(), shares))
    }

    /// Number of open positions.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// True when no position is open.
    pub fn is_flat(&self) -> bool {
        self.shares.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use marketsim_core::Side;

    fn order(symbol: &str, side: Side, shares: u32) -> Order {
        Order::new(NaiveDate::from_ymd_opt(2011, 1, 10).unwrap(), symbol, side, shares).unwrap()
    }

    #[test]
    fn test_absent_is_zero() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.shares("AAPL"), 0);
        assert!(!ledger.is_short("AAPL"));
        assert!(ledger.is_flat());
    }

    #[test]
    fn test_buy_then_partial_sell() {
        let mut ledger = PositionLedger::new();

        assert_eq!(ledger.apply(&order("AAPL", Side::Buy, 10)), 10);
        assert_eq!(ledger.apply(&order("AAPL", Side::Sell, 4)), 6);
        assert_eq!(ledger.shares("AAPL"), 6);
        assert!(!ledger.is_short("AAPL"));
    }

    #[test]
    fn test_sell_without_position_opens_short() {
        let mut ledger = PositionLedger::new();

        assert_eq!(ledger.apply(&order("XOM", Side::Sell, 5)), -5);
        assert!(ledger.is_short("XOM"));
        assert_eq!(ledger.apply(&order("XOM", Side::Sell, 5)), -10);
    }

    #[test]
    fn test_oversell_crosses_zero() {
        let mut ledger = PositionLedger::new();
        ledger.apply(&order("IBM", Side::Buy, 3));

        assert_eq!(ledger.apply(&order("IBM", Side::Sell, 8)), -5);
        assert!(ledger.is_short("IBM"));
    }

    #[test]
    fn test_flat_positions_dropped() {
        let mut ledger = PositionLedger::new();
        ledger.apply(&order("GOOG", Side::Buy, 7));
        ledger.apply(&order("AAPL", Side::Buy, 1));
        ledger.apply(&order("GOOG", Side::Sell, 7));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.open_positions().collect::<Vec<_>>(), vec![("AAPL", 1)]);
    }
}
