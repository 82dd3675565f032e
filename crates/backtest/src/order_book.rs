//! Orders grouped by execution date.
//!
//! Same-date orders keep their input order; that is the only tie-break.
//! Duplicate orders are kept and execute independently.

use chrono::NaiveDate;
use marketsim_core::{Error, Order, Result, TradingCalendar};
use std::collections::{BTreeMap, BTreeSet};

/// Orders keyed by session date.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    by_date: BTreeMap<NaiveDate, Vec<Order>>,
    count: usize,
}

impl OrderBook {
    /// Group orders by date, preserving input order within a date.
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let mut book = Self::default();
        for order in orders {
            book.by_date.entry(order.date()).or_default().push(order);
            book.count += 1;
        }
        book
    }

    /// Orders scheduled on `date`, in input order.
    pub fn orders_on(&self, date: NaiveDate) -> &[Order] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Earliest order date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }

    /// Latest order date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    /// Distinct order dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    /// Every symbol that appears in any order.
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.by_date
            .values()
            .flatten()
            .map(Order::symbol)
            .collect()
    }

    /// Total number of orders.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check that the book is replayable on `calendar`: non-empty, and
    /// every order dated on a session. Returns the replay window.
    pub fn validate<C: TradingCalendar + ?Sized>(&self, calendar: &C) -> Result<(NaiveDate, NaiveDate)> {
        let (first, last) = match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::insufficient_data("no orders to simulate")),
        };

        if let Some(date) = self.dates().find(|d| !calendar.is_session(*d)) {
            return Err(Error::OffCalendar { date });
        }

        Ok((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketsim_core::{NyseCalendar, Side};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 1, d).unwrap()
    }

    fn order(d: u32, symbol: &str, side: Side, shares: u32) -> Order {
        Order::new(date(d), symbol, side, shares).unwrap()
    }

    #[test]
    fn test_groups_by_date_in_input_order() {
        let book = OrderBook::from_orders(vec![
            order(13, "IBM", Side::Sell, 5),
            order(10, "AAPL", Side::Buy, 10),
            order(13, "AAPL", Side::Buy, 2),
            order(13, "IBM", Side::Sell, 5),
        ]);

        assert_eq!(book.len(), 4);
        assert_eq!(book.first_date(), Some(date(10)));
        assert_eq!(book.last_date(), Some(date(13)));

        let same_day = book.orders_on(date(13));
        assert_eq!(same_day.len(), 3);
        assert_eq!(same_day[0].symbol(), "IBM");
        assert_eq!(same_day[1].symbol(), "AAPL");
        // Duplicates are kept.
        assert_eq!(same_day[0], same_day[2]);

        assert!(book.orders_on(date(11)).is_empty());
        assert_eq!(book.symbols().into_iter().collect::<Vec<_>>(), vec!["AAPL", "IBM"]);
    }

    #[test]
    fn test_validate_empty() {
        let book = OrderBook::from_orders(Vec::new());
        assert!(matches!(
            book.validate(&NyseCalendar),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_validate_weekend_order() {
        // Jan 15 2011 was a Saturday.
        let book = OrderBook::from_orders(vec![order(10, "AAPL", Side::Buy, 1), order(15, "AAPL", Side::Sell, 1)]);
        match book.validate(&NyseCalendar) {
            Err(Error::OffCalendar { date: d }) => assert_eq!(d, date(15)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_window() {
        let book = OrderBook::from_orders(vec![order(14, "AAPL", Side::Buy, 1), order(10, "AAPL", Side::Sell, 1)]);
        assert_eq!(book.validate(&NyseCalendar).unwrap(), (date(10), date(14)));
    }
}
