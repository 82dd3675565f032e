//! Core types and configuration for the marketsim backtester.
//!
//! This crate provides shared types used across all other crates:
//! - Orders, sides and valuation points
//! - Price table and trading calendar collaborators
//! - Configuration structures
//! - Common error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod prices;
pub mod types;

pub use calendar::{NyseCalendar, PriceTableCalendar, TradingCalendar};
pub use config::Config;
pub use error::{Error, Result};
pub use prices::{InMemoryPriceTable, PriceTable};
pub use types::*;
