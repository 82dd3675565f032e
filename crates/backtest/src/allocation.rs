//! Discretized allocation vectors and buy-and-hold allocation simulation.

use crate::metrics::{FundProperties, MetricsCalculator};
use marketsim_core::{Error, Result};

/// Lazy iterator over every allocation of `granularity` equal steps across
/// `n` symbols.
///
/// Each item has `n` weights in `[0, 1]`, each a multiple of
/// `1 / granularity`, summing to one. Items come in reverse lexicographic
/// order of their step counts, starting with everything in the first symbol.
/// There are `C(granularity + n - 1, n - 1)` items.
#[derive(Debug, Clone)]
pub struct Allocations {
    steps: Vec<u32>,
    granularity: u32,
    done: bool,
}

impl Allocations {
    /// Create the iterator. Both `n` and `granularity` must be positive.
    pub fn new(n: usize, granularity: u32) -> Result<Self> {
        if n == 0 {
            return Err(Error::config("allocation needs at least one symbol"));
        }
        if granularity == 0 {
            return Err(Error::config("allocation granularity must be positive"));
        }
        let mut steps = vec![0; n];
        steps[0] = granularity;
        Ok(Self {
            steps,
            granularity,
            done: false,
        })
    }

    /// Total number of allocations the iterator yields, or `None` when it
    /// does not fit in a `u64`.
    pub fn count_total(&self) -> Option<u64> {
        let n = self.steps.len() as u64;
        binomial(u64::from(self.granularity) + n - 1, n - 1)
    }

    /// Step counts to the next composition; false when exhausted.
    fn advance(&mut self) -> bool {
        let last_idx = self.steps.len() - 1;
        let tail = self.steps[last_idx];
        self.steps[last_idx] = 0;

        match self.steps[..last_idx].iter().rposition(|&s| s > 0) {
            Some(i) => {
                self.steps[i] -= 1;
                self.steps[i + 1] = tail + 1;
                true
            }
            None => false,
        }
    }
}

impl Iterator for Allocations {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let scale = f64::from(self.granularity);
        let weights = self.steps.iter().map(|&s| f64::from(s) / scale).collect();
        self.done = !self.advance();
        Some(weights)
    }
}

/// `C(n, k)`. Each partial product `C(n, i) * (n - i)` fits in a `u128`
/// whenever the result fits in a `u64`.
fn binomial(n: u64, k: u64) -> Option<u64> {
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul(u128::from(n - i))? / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return None;
        }
    }
    u64::try_from(acc).ok()
}

/// Value curve of a buy-and-hold fund.
///
/// `closes` is a `sessions x symbols` matrix. Each symbol's closes are
/// normalized by its first close and weighted, so the curve starts at the
/// sum of the weights.
pub fn allocation_values(closes: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>> {
    let first = closes
        .first()
        .ok_or_else(|| Error::insufficient_data("no sessions to allocate over"))?;
    if first.len() != weights.len() {
        return Err(Error::data(format!(
            "{} weights for {} symbols",
            weights.len(),
            first.len()
        )));
    }
    if first.iter().any(|&c| !(c > 0.0)) {
        return Err(Error::data("first close must be positive for every symbol"));
    }

    let values: Vec<f64> = closes
        .iter()
        .map(|row| {
            row.iter()
                .zip(first)
                .zip(weights)
                .map(|((close, base), weight)| weight * close / base)
                .sum::<f64>()
        })
        .collect();
    Ok(values)
}

/// Properties of a buy-and-hold fund with the given weights.
pub fn simulate_allocation(
    closes: &[Vec<f64>],
    weights: &[f64],
    metrics: &MetricsCalculator,
) -> Result<FundProperties> {
    let values = allocation_values(closes, weights)?;
    metrics.fund_properties(&values)
}
