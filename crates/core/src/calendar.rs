//! Trading session calendars.
//!
//! A calendar answers one question: which dates are market sessions. The
//! simulation walks `sessions(first_order_date, last_order_date)` as its
//! time axis.

use crate::prices::InMemoryPriceTable;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Ordered set of valid market-session dates.
pub trait TradingCalendar {
    /// Whether `date` is a market session.
    fn is_session(&self, date: NaiveDate) -> bool;

    /// Sessions in the closed interval `[start, end]`, ascending.
    /// Empty when `start > end`.
    fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_session(*d))
            .collect()
    }
}

/// Full-day NYSE closures outside the holiday rules (weather, national
/// mourning, market emergencies), as `(year, month, day)`.
const UNSCHEDULED_CLOSURES: &[(i32, u32, u32)] = &[
    (1985, 9, 27),  // Hurricane Gloria
    (1994, 4, 27),  // Nixon funeral
    (2001, 9, 11),  // September 11
    (2001, 9, 12),
    (2001, 9, 13),
    (2001, 9, 14),
    (2004, 6, 11),  // Reagan funeral
    (2007, 1, 2),   // Ford funeral
    (2012, 10, 29), // Hurricane Sandy
    (2012, 10, 30),
    (2018, 12, 5),  // G.H.W. Bush funeral
    (2025, 1, 9),   // Carter funeral
];

/// Rule-based NYSE calendar: weekdays minus the exchange's full-day
/// holidays and its known unscheduled closures. Closures after the table
/// was last updated are unknown; use [`PriceTableCalendar`] when the price
/// data is the authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct NyseCalendar;

impl NyseCalendar {
    pub fn new() -> Self {
        Self
    }

    /// Full-day NYSE closures in `year`, ascending.
    pub fn holidays(year: i32) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(10);

        // New Year's Day: Sunday moves to Monday, Saturday is not observed.
        if let Some(jan1) = NaiveDate::from_ymd_opt(year, 1, 1) {
            match jan1.weekday() {
                Weekday::Sat => {}
                Weekday::Sun => days.push(jan1 + Duration::days(1)),
                _ => days.push(jan1),
            }
        }

        if year >= 1998 {
            days.extend(nth_weekday(year, 1, Weekday::Mon, 3));
        }
        days.extend(nth_weekday(year, 2, Weekday::Mon, 3));
        days.extend(easter_sunday(year).map(|easter| easter - Duration::days(2)));
        days.extend(last_weekday(year, 5, Weekday::Mon));
        if year >= 2022 {
            days.extend(observed(year, 6, 19));
        }
        days.extend(observed(year, 7, 4));
        days.extend(nth_weekday(year, 9, Weekday::Mon, 1));
        days.extend(nth_weekday(year, 11, Weekday::Thu, 4));
        days.extend(observed(year, 12, 25));

        days.extend(
            UNSCHEDULED_CLOSURES
                .iter()
                .filter(|(y, _, _)| *y == year)
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        );

        days.sort();
        days
    }
}

impl TradingCalendar for NyseCalendar {
    fn is_session(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !Self::holidays(date.year()).contains(&date)
    }
}

/// Calendar whose sessions are exactly the dates present in a price table.
#[derive(Debug, Clone, Default)]
pub struct PriceTableCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl PriceTableCalendar {
    pub fn new(dates: BTreeSet<NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn from_table(table: &InMemoryPriceTable) -> Self {
        Self::new(table.dates())
    }
}

impl TradingCalendar for PriceTableCalendar {
    fn is_session(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        self.dates.range(start..=end).copied().collect()
    }
}

#[inline]
fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Fixed-date holiday: Saturday moves to Friday, Sunday to Monday.
fn observed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    })
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, 5).or_else(|| nth_weekday(year, month, weekday, 4))
}

/// Western (Gregorian) Easter Sunday, anonymous Gregorian algorithm.
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
