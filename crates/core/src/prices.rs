//! Closing price lookup.
//!
//! The simulation only reads prices; it never fills, interpolates or
//! substitutes them. Absence of a required close is an error.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Read-only source of daily closing prices.
pub trait PriceTable {
    /// Close of `symbol` on `date`, if known.
    fn close(&self, symbol: &str, date: NaiveDate) -> Option<f64>;

    /// Close of `symbol` on `date`, or `Error::MissingPrice`.
    fn require_close(&self, symbol: &str, date: NaiveDate) -> Result<f64> {
        self.close(symbol, date)
            .ok_or_else(|| Error::missing_price(symbol, date))
    }
}

/// Price table held fully in memory, keyed by symbol then date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceTable {
    closes: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl InMemoryPriceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a close. Non-finite or non-positive prices are rejected.
    pub fn insert(&mut self, symbol: impl Into<String>, date: NaiveDate, close: f64) -> Result<()> {
        let symbol = symbol.into();
        if !close.is_finite() || close <= 0.0 {
            return Err(Error::data(format!(
                "invalid close {close} for {symbol} on {date}"
            )));
        }
        self.closes.entry(symbol).or_default().insert(date, close);
        Ok(())
    }

    /// Number of (symbol, date) entries.
    pub fn len(&self) -> usize {
        self.closes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbols with at least one close, in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.closes.keys().map(String::as_str)
    }

    /// Union of all dates with a close for any symbol, ascending.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.closes
            .values()
            .flat_map(|series| series.keys().copied())
            .collect()
    }

    /// Dense `dates.len() x symbols.len()` close matrix.
    ///
    /// Gaps are filled forward, then backward, then with 1.0 for a symbol
    /// that has no data at all in the window. Only the allocation study
    /// uses this; order replay always goes through [`PriceTable::require_close`].
    pub fn aligned_closes(&self, symbols: &[String], dates: &[NaiveDate]) -> Vec<Vec<f64>> {
        let mut matrix = vec![vec![f64::NAN; symbols.len()]; dates.len()];

        for (col, symbol) in symbols.iter().enumerate() {
            for (row, date) in dates.iter().enumerate() {
                if let Some(close) = self.close(symbol, *date) {
                    matrix[row][col] = close;
                }
            }

            // Forward fill
            let mut last = None;
            for row in matrix.iter_mut() {
                if row[col].is_nan() {
                    if let Some(prev) = last {
                        row[col] = prev;
                    }
                } else {
                    last = Some(row[col]);
                }
            }

            // Backward fill
            let mut next = None;
            for row in matrix.iter_mut().rev() {
                if row[col].is_nan() {
                    row[col] = next.unwrap_or(1.0);
                } else {
                    next = Some(row[col]);
                }
            }
        }

        matrix
    }
}

impl PriceTable for InMemoryPriceTable {
    fn close(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.closes.get(symbol)?.get(&date).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 1, d).unwrap()
    }

    #[test]
    fn test_require_close_missing() {
        let mut table = InMemoryPriceTable::new();
        table.insert("AAPL", date(10), 342.0).unwrap();

        assert_eq!(table.require_close("AAPL", date(10)).unwrap(), 342.0);
        let err = table.require_close("AAPL", date(11)).unwrap_err();
        assert!(matches!(err, Error::MissingPrice { ref symbol, .. } if symbol == "AAPL"));
        assert!(table.require_close("IBM", date(10)).is_err());
    }

    #[test]
    fn test_insert_rejects_bad_prices() {
        let mut table = InMemoryPriceTable::new();
        assert!(table.insert("X", date(3), 0.0).is_err());
        assert!(table.insert("X", date(3), -5.0).is_err());
        assert!(table.insert("X", date(3), f64::NAN).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_dates_union() {
        let mut table = InMemoryPriceTable::new();
        table.insert("A", date(3), 1.0).unwrap();
        table.insert("B", date(4), 1.0).unwrap();
        table.insert("A", date(5), 1.0).unwrap();

        let dates: Vec<_> = table.dates().into_iter().collect();
        assert_eq!(dates, vec![date(3), date(4), date(5)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_aligned_closes_fills_gaps() {
        let mut table = InMemoryPriceTable::new();
        table.insert("A", date(4), 10.0).unwrap();
        table.insert("A", date(6), 12.0).unwrap();

        let symbols = vec!["A".to_string(), "B".to_string()];
        let dates = vec![date(3), date(4), date(5), date(6)];
        let matrix = table.aligned_closes(&symbols, &dates);

        // Leading gap is back-filled, interior gap forward-filled.
        let a: Vec<f64> = matrix.iter().map(|row| row[0]).collect();
        assert_eq!(a, vec![10.0, 10.0, 10.0, 12.0]);

        // No data at all falls back to 1.0.
        assert!(matrix.iter().all(|row| row[1] == 1.0));
    }
}
