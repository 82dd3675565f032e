//! Backtesting engine for the marketsim toolkit.
//!
//! This crate provides:
//! - Order replay over a trading calendar with daily mark-to-market
//! - Position and cash accounting (shorts and overdraft allowed by default)
//! - Fund vs benchmark performance metrics
//! - Discretized allocation search

pub mod allocation;
pub mod metrics;
pub mod optimizer;
pub mod order_book;
pub mod portfolio;
pub mod position;
pub mod simulator;

pub use allocation::Allocations;
pub use metrics::{BenchmarkComparison, FundProperties, MetricsCalculator};
pub use optimizer::{AllocationOptimizer, OptimizationResult};
pub use order_book::OrderBook;
pub use portfolio::Portfolio;
pub use position::PositionLedger;
pub use simulator::{execute_order, ExecutionPolicy, MarketSimulator, SimulationResult};
