//! Error types for the marketsim backtester.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the marketsim backtester.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or inconsistent data).
    #[error("Data error: {0}")]
    Data(String),

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An order record could not be parsed or validated.
    #[error("Malformed order at line {line}: {reason}")]
    MalformedOrder { line: usize, reason: String },

    /// The price table has no close for a required (symbol, date).
    #[error("Missing price for {symbol} on {date}")]
    MissingPrice { symbol: String, date: NaiveDate },

    /// An order is dated on a day that is not a trading session.
    #[error("Order date {date} is not a trading session")]
    OffCalendar { date: NaiveDate },

    /// An order breaks an enabled portfolio policy.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create a malformed order error for a 1-based input line.
    pub fn malformed_order(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedOrder {
            line,
            reason: reason.into(),
        }
    }

    /// Create a missing price error.
    pub fn missing_price(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Error::MissingPrice {
            symbol: symbol.into(),
            date,
        }
    }

    /// Create a policy violation error.
    pub fn policy_violation(msg: impl Into<String>) -> Self {
        Error::PolicyViolation(msg.into())
    }
}
