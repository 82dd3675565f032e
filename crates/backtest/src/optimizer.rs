//! Exhaustive allocation search.
//!
//! Scores every discretized allocation of a fixed symbol set by the Sharpe
//! ratio of its buy-and-hold value curve and keeps the best one.

use crate::allocation::{simulate_allocation, Allocations};
use crate::metrics::{FundProperties, MetricsCalculator};
use chrono::NaiveDate;
use marketsim_core::config::OptimizerConfig;
use marketsim_core::{Error, InMemoryPriceTable, Result, TradingCalendar};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, info};

/// Best allocation found by the search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Symbols, in the order the weights refer to.
    pub symbols: Vec<String>,
    /// Weight per symbol, summing to one.
    pub allocation: Vec<f64>,
    /// Properties of the winning allocation.
    pub properties: FundProperties,
    /// Number of allocations scored.
    pub evaluated: usize,
}

/// Allocation optimizer.
pub struct AllocationOptimizer {
    config: OptimizerConfig,
    metrics: MetricsCalculator,
}

impl AllocationOptimizer {
    /// Create a new optimizer.
    pub fn new(config: OptimizerConfig, metrics: MetricsCalculator) -> Self {
        Self { config, metrics }
    }

    /// Search allocations of `symbols` over the sessions in `[start, end]`.
    pub fn optimize<C: TradingCalendar + ?Sized>(
        &self,
        prices: &InMemoryPriceTable,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        calendar: &C,
    ) -> Result<OptimizationResult> {
        let sessions = calendar.sessions(start, end);
        if sessions.is_empty() {
            return Err(Error::insufficient_data(format!(
                "no sessions between {start} and {end}"
            )));
        }
        let closes = prices.aligned_closes(symbols, &sessions);

        info!(
            symbols = symbols.len(),
            sessions = sessions.len(),
            granularity = self.config.granularity,
            "starting allocation search"
        );

        let (best, evaluated) = if self.config.workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers as usize)
                .build()
                .map_err(|e| Error::config(format!("thread pool: {e}")))?;
            pool.install(|| self.search(&closes, symbols.len()))
        } else {
            self.search(&closes, symbols.len())
        }?;

        info!(
            evaluated,
            sharpe = best.properties.sharpe_ratio,
            "allocation search complete"
        );

        Ok(OptimizationResult {
            symbols: symbols.to_vec(),
            allocation: best.allocation,
            properties: best.properties,
            evaluated,
        })
    }

    /// Score every allocation and return the best with the number scored.
    /// Ties keep the earliest allocation; NaN scores never win.
    fn search(&self, closes: &[Vec<f64>], n_symbols: usize) -> Result<(Candidate, usize)> {
        let allocations = Allocations::new(n_symbols, self.config.granularity)?;
        debug!(total = ?allocations.count_total(), "enumerating allocations");

        let state = allocations
            .enumerate()
            .par_bridge()
            .map(|(idx, allocation)| -> Result<SearchState> {
                let properties = simulate_allocation(closes, &allocation, &self.metrics)?;
                Ok(SearchState::scored(Candidate {
                    idx,
                    allocation,
                    properties,
                }))
            })
            .try_reduce(SearchState::default, |a, b| Ok(a.merge(b)))?;

        let best = state
            .best
            .ok_or_else(|| Error::data("no allocation produced a finite Sharpe ratio"))?;

        debug!(allocation = ?best.allocation, "best allocation");
        Ok((best, state.evaluated))
    }
}

#[derive(Debug)]
struct Candidate {
    idx: usize,
    allocation: Vec<f64>,
    properties: FundProperties,
}

impl Candidate {
    /// Higher Sharpe first, then lower enumeration index.
    fn rank(&self) -> (OrderedFloat<f64>, Reverse<usize>) {
        (OrderedFloat(self.properties.sharpe_ratio), Reverse(self.idx))
    }
}

/// Partial result of the search over some subset of allocations.
#[derive(Debug, Default)]
struct SearchState {
    evaluated: usize,
    best: Option<Candidate>,
}

impl SearchState {
    fn scored(candidate: Candidate) -> Self {
        let finite = !candidate.properties.sharpe_ratio.is_nan();
        Self {
            evaluated: 1,
            best: finite.then_some(candidate),
        }
    }

    /// Order-independent: the rank is a total order with unique indices.
    fn merge(self, other: Self) -> Self {
        let best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(if b.rank() > a.rank() { b } else { a }),
            (a, b) => a.or(b),
        };
        Self {
            evaluated: self.evaluated + other.evaluated,
            best,
        }
    }
}
