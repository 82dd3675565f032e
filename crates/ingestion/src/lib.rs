//! Data ingestion for the marketsim backtester.
//!
//! This crate handles:
//! - Order file parsing (fail-fast on malformed rows)
//! - Closing price loading into a price table
//! - Valuation series reading and writing

pub mod orders;
pub mod prices;
pub mod valuations;

pub use orders::{read_orders, read_orders_file};
pub use prices::{read_prices, read_prices_file};
pub use valuations::{read_valuations, read_valuations_file, write_valuations, write_valuations_file};
