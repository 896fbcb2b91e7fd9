//! Pay period handling.
//!
//! A period is a single calendar month, carried on the wire and in the
//! database as a `Mon-YYYY` label (e.g. `Jan-2026`). One payslip exists per
//! employee per period.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ServiceError;

/// Label format, matching the stored `month_year` column.
pub const MONTH_YEAR_FORMAT: &str = "%b-%Y";

/// A month+year billing cycle. Internally the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayPeriod(NaiveDate);

impl PayPeriod {
    pub fn from_month_year(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Canonical label, e.g. `Feb-2026`.
    pub fn label(&self) -> String {
        self.0.format(MONTH_YEAR_FORMAT).to_string()
    }

    /// Three-letter month abbreviation, e.g. `Feb`.
    pub fn month_abbrev(&self) -> String {
        self.0.format("%b").to_string()
    }

    /// Last calendar day of the period's month, leap-aware.
    pub fn last_day(&self) -> u32 {
        let (next_year, next_month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        // First of next month always exists for a valid period.
        let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .unwrap_or(self.0)
            .pred_opt()
            .unwrap_or(self.0);
        first_of_next.day()
    }

    /// Payslip period range, e.g. `01-FEB-2026 TO 28-FEB-2026`.
    pub fn range_label(&self) -> String {
        let upper = self.label().to_uppercase();
        format!("01-{} TO {}-{}", upper, self.last_day(), upper)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PayPeriod {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono needs a day component to parse a date.
        NaiveDate::parse_from_str(&format!("01-{}", s.trim()), "%d-%b-%Y")
            .map(PayPeriod)
            .map_err(|_| {
                ServiceError::ValidationError(format!(
                    "invalid period '{}', expected Mon-YYYY (e.g. Jan-2026)",
                    s
                ))
            })
    }
}

impl Serialize for PayPeriod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for PayPeriod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Distinct filter options derived from stored period labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodFilters {
    /// Periods, newest first.
    pub periods: Vec<PayPeriod>,
    /// Month abbreviations in first-seen (newest-period) order.
    pub months: Vec<String>,
    /// Years, newest first.
    pub years: Vec<String>,
}

/// Builds filter dropdown options from raw `month_year` values, silently
/// dropping labels that fail to parse.
pub fn build_period_filters<I, S>(period_values: I) -> PeriodFilters
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut periods: Vec<PayPeriod> = period_values
        .into_iter()
        .filter_map(|v| v.as_ref().parse().ok())
        .collect();
    periods.sort_unstable();
    periods.dedup();
    periods.reverse();

    let mut months = Vec::new();
    for period in &periods {
        let name = period.month_abbrev();
        if !months.contains(&name) {
            months.push(name);
        }
    }

    let mut years: Vec<String> = periods.iter().map(|p| p.year().to_string()).collect();
    years.dedup();

    PeriodFilters {
        periods,
        months,
        years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_round_trips_labels() {
        let period: PayPeriod = "Feb-2026".parse().unwrap();
        assert_eq!(period.year(), 2026);
        assert_eq!(period.month(), 2);
        assert_eq!(period.label(), "Feb-2026");
        assert_eq!(period.to_string(), "Feb-2026");
    }

    #[test]
    fn rejects_malformed_labels() {
        assert!("February-2026".parse::<PayPeriod>().is_err());
        assert!("Feb/2026".parse::<PayPeriod>().is_err());
        assert!("".parse::<PayPeriod>().is_err());
        assert!("Feb-26".parse::<PayPeriod>().is_err());
    }

    #[test]
    fn range_label_covers_the_whole_month() {
        let feb: PayPeriod = "Feb-2026".parse().unwrap();
        assert_eq!(feb.range_label(), "01-FEB-2026 TO 28-FEB-2026");

        let leap: PayPeriod = "Feb-2024".parse().unwrap();
        assert_eq!(leap.range_label(), "01-FEB-2024 TO 29-FEB-2024");

        let dec: PayPeriod = "Dec-2025".parse().unwrap();
        assert_eq!(dec.range_label(), "01-DEC-2025 TO 31-DEC-2025");
    }

    #[test]
    fn filters_are_distinct_and_newest_first() {
        let filters = build_period_filters([
            "Jan-2026",
            "Feb-2026",
            "Jan-2026",
            "Dec-2025",
            "garbage",
            "Feb-2025",
        ]);

        let labels: Vec<String> = filters.periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Feb-2026", "Jan-2026", "Dec-2025", "Feb-2025"]);
        assert_eq!(filters.months, vec!["Feb", "Jan", "Dec"]);
        assert_eq!(filters.years, vec!["2026", "2025"]);
    }
}
