use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use nb_core::{Error, Result};

/// Month name, non-zero-padded day, year: "March 5, 2024".
pub const DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Render a date in the canonical display form used for membership tests
/// against text scraped from the page.
pub fn render_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// The set of calendar dates considered in range for a run: every day of
/// every target month from `months_back` months ago through the reference
/// month, with no gaps. Built once per run and shared read-only.
#[derive(Debug, Clone)]
pub struct DateWindow {
    dates: BTreeSet<NaiveDate>,
    rendered: BTreeSet<String>,
}

impl DateWindow {
    /// Builds the window for `months_back` months before `reference`,
    /// inclusive of the reference month. `months_back` of 0 keeps only the
    /// reference month. Negative input is a configuration error.
    pub fn build(months_back: i32, reference: NaiveDate) -> Result<Self> {
        if months_back < 0 {
            return Err(Error::InvalidInput(format!(
                "months must be a non-negative integer, got {months_back}"
            )));
        }

        let mut dates = BTreeSet::new();
        for i in 0..=months_back {
            let mut month = reference.month() as i32 - i;
            let mut year = reference.year();
            // Month 0 and below wrap into the prior year.
            while month <= 0 {
                month += 12;
                year -= 1;
            }

            let first = NaiveDate::from_ymd_opt(year, month as u32, 1).ok_or_else(|| {
                Error::InvalidInput(format!("target month {year}-{month} is out of range"))
            })?;
            // Last day of the month: first day of the next month minus one.
            // Handles month lengths and leap years without a lookup table.
            let next_first = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month as u32 + 1, 1)
            }
            .ok_or_else(|| {
                Error::InvalidInput(format!("target month {year}-{month} is out of range"))
            })?;
            let last = next_first - Duration::days(1);

            let mut day = first;
            while day <= last {
                dates.insert(day);
                day = day + Duration::days(1);
            }
        }

        let rendered = dates.iter().map(|d| render_date(*d)).collect();
        Ok(Self { dates, rendered })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Membership test against a canonically rendered date string.
    pub fn contains_str(&self, rendered: &str) -> bool {
        self.rendered.contains(rendered)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_months_back_covers_reference_month_only() {
        let window = DateWindow::build(0, date(2024, 3, 15)).unwrap();
        assert_eq!(window.len(), 31);
        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 31)));
        assert!(!window.contains(date(2024, 2, 29)));
        assert!(!window.contains(date(2024, 4, 1)));
    }

    #[test]
    fn test_window_wraps_december_into_prior_year() {
        let window = DateWindow::build(1, date(2024, 1, 10)).unwrap();
        // All of December 2023 plus all of January 2024.
        assert_eq!(window.len(), 31 + 31);
        assert!(window.contains(date(2023, 12, 1)));
        assert!(window.contains(date(2023, 12, 31)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2023, 11, 30)));
    }

    #[test]
    fn test_window_includes_leap_day() {
        let window = DateWindow::build(1, date(2024, 3, 10)).unwrap();
        assert_eq!(window.len(), 29 + 31);
        assert!(window.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_window_is_contiguous() {
        let window = DateWindow::build(2, date(2024, 1, 5)).unwrap();
        let mut day = date(2023, 11, 1);
        let last = date(2024, 1, 31);
        while day <= last {
            assert!(window.contains(day), "gap at {day}");
            day = day + Duration::days(1);
        }
        assert_eq!(window.len(), 30 + 31 + 31);
    }

    #[test]
    fn test_negative_months_is_invalid_input() {
        let err = DateWindow::build(-1, date(2024, 3, 15)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_render_day_is_not_zero_padded() {
        assert_eq!(render_date(date(2024, 3, 5)), "March 5, 2024");
        assert_eq!(render_date(date(2024, 12, 25)), "December 25, 2024");
    }

    #[test]
    fn test_contains_str_uses_canonical_form() {
        let window = DateWindow::build(0, date(2024, 3, 15)).unwrap();
        assert!(window.contains_str("March 5, 2024"));
        assert!(!window.contains_str("March 05, 2024"));
        assert!(!window.contains_str("February 5, 2024"));
    }
}
