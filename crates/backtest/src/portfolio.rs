//! Cash and marked-to-market holdings.

use marketsim_core::Shares;
use std::collections::BTreeMap;

/// Cash balance plus per-symbol holdings valuation.
///
/// `holdings[symbol]` is always `shares x price` for the latest price the
/// simulator marked it with; it is never adjusted independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    cash: f64,
    holdings: BTreeMap<String, f64>,
}

impl Portfolio {
    /// Create a portfolio holding only cash.
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            holdings: BTreeMap::new(),
        }
    }

    /// Current cash balance (may be negative).
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Valuation of one holding (zero when not held).
    pub fn holding(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    /// Sum of holdings valuations.
    pub fn holdings_value(&self) -> f64 {
        self.holdings.values().sum()
    }

    /// Cash plus holdings.
    pub fn equity(&self) -> f64 {
        self.cash + self.holdings_value()
    }

    /// Add `amount` to cash (negative to debit).
    pub(crate) fn adjust_cash(&mut self, amount: f64) {
        self.cash += amount;
    }

    /// Revalue a holding at `price`. A flat position is removed.
    pub(crate) fn mark(&mut self, symbol: &str, shares: Shares, price: f64) {
        if shares == 0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.to_string(), shares as f64 * price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_cash() {
        let portfolio = Portfolio::new(10_000.0);
        assert_eq!(portfolio.cash(), 10_000.0);
        assert_eq!(portfolio.equity(), 10_000.0);
        assert_eq!(portfolio.holdings_value(), 0.0);
    }

    #[test]
    fn test_equity_includes_short_holdings() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.adjust_cash(-1_000.0);
        portfolio.mark("X", 10, 100.0);
        portfolio.adjust_cash(250.0);
        portfolio.mark("Y", -5, 50.0);

        assert!((portfolio.holding("X") - 1_000.0).abs() < 1e-10);
        assert!((portfolio.holding("Y") + 250.0).abs() < 1e-10);
        assert!((portfolio.equity() - 10_000.0).abs() < 1e-10);
    }

    #[test]
    fn test_mark_flat_removes_holding() {
        let mut portfolio = Portfolio::new(0.0);
        portfolio.mark("X", 10, 100.0);
        portfolio.mark("X", 0, 120.0);

        assert_eq!(portfolio.holding("X"), 0.0);
        assert_eq!(portfolio.holdings_value(), 0.0);
    }
}
