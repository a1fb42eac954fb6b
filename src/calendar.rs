//! Date parsing, date keys and per-month tallies.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// The only accepted date layout, in sources and in query arguments.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parses a zero-padded `YYYY-MM-DD` date.
///
/// The layout is checked before handing off to chrono, so `2019-1-5` or
/// `2019/01/05` are rejected rather than leniently accepted.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Concatenates the year, month and day digits into one integer.
///
/// `2019-01-05` becomes `20190105`. For well-formed dates the integer order
/// matches calendar order.
pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// English name of a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Number of transactions that fell in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCount {
    /// 1-based month number
    pub month: u32,
    pub name: &'static str,
    pub count: usize,
}

impl MonthCount {
    /// Zero-padded month number, e.g. `"01"`.
    pub fn code(&self) -> String {
        format!("{:02}", self.month)
    }
}

impl fmt::Display for MonthCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.code(), self.name, self.count)
    }
}

/// Tallies dates into the twelve calendar months, regardless of year.
pub fn tally_months<I>(dates: I) -> [usize; 12]
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = [0usize; 12];
    for date in dates {
        counts[date.month0() as usize] += 1;
    }
    counts
}

/// Returns every month tied for the highest count, in calendar order.
///
/// Months with no transactions take part at zero, so an all-zero tally
/// returns all twelve months.
pub fn busiest_months(counts: [usize; 12]) -> Vec<MonthCount> {
    let mut ranked: Vec<MonthCount> = (1..=12u32)
        .zip(counts)
        .map(|(month, count)| MonthCount {
            month,
            name: month_name(month).unwrap_or_default(),
            count,
        })
        .collect();

    // Stable sort keeps calendar order among equal counts.
    ranked.sort_by_key(|m| m.count);

    let Some(max) = ranked.last().map(|m| m.count) else {
        return Vec::new();
    };
    let first_tied = ranked
        .iter()
        .rposition(|m| m.count != max)
        .map_or(0, |i| i + 1);

    ranked.split_off(first_tied)
}
