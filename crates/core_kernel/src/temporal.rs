//! Jakarta-local time helpers
//!
//! Document dates, sequence years, due-date checks, and tax-document expiry
//! are all evaluated in Indonesian western time (WIB, Asia/Jakarta).

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Asia::Jakarta;

/// Returns the current instant in UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Returns today's date in Jakarta local time
pub fn jakarta_today() -> NaiveDate {
    Utc::now().with_timezone(&Jakarta).date_naive()
}

/// Returns the current calendar year in Jakarta local time
pub fn jakarta_year() -> i32 {
    jakarta_today().year()
}

/// Returns the number of whole calendar months from `from` to `to`
///
/// A partial month does not count: 2026-01-31 to 2026-02-28 is zero months.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -months_between(to, from);
    }
    let mut months = (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_between_whole_months() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap();
        assert_eq!(months_between(from, to), 3);
    }

    #[test]
    fn test_months_between_partial_month() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(months_between(from, to), 0);
    }

    #[test]
    fn test_months_between_reversed_is_negative() {
        let from = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(months_between(from, to), -3);
    }

    #[test]
    fn test_jakarta_year_is_plausible() {
        assert!(jakarta_year() >= 2024);
    }
}
