//! Sunday-anchored week arithmetic.
//!
//! Weekly carts are keyed by the canonical Sunday of their week; every
//! consumer of week-scoped state goes through these helpers so the anchor
//! is decided in exactly one place.

use chrono::{Datelike, Days, NaiveDate};

/// Short labels for the seven week columns, Sunday first.
pub const DAY_LABELS: [&str; 7] = ["Su", "M", "Tu", "W", "Th", "F", "Sa"];

/// The Sunday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date - Days::new(offset)
}

/// The Saturday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Days::new(6)
}

/// The seven dates of the week containing `date`, Sunday through Saturday.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(date);
    std::array::from_fn(|offset| start + Days::new(offset as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        raw.parse().expect("test date")
    }

    #[test]
    fn week_start_is_sunday() {
        // 2025-11-12 is a Wednesday; its week starts 2025-11-09.
        assert_eq!(week_start(date("2025-11-12")), date("2025-11-09"));
        assert_eq!(week_start(date("2025-11-09")), date("2025-11-09"));
        assert_eq!(week_start(date("2025-11-15")), date("2025-11-09"));
    }

    #[test]
    fn week_end_is_saturday() {
        assert_eq!(week_end(date("2025-11-12")), date("2025-11-15"));
    }

    #[test]
    fn week_dates_cover_sunday_through_saturday() {
        let dates = week_dates(date("2025-11-12"));
        assert_eq!(dates[0], date("2025-11-09"));
        assert_eq!(dates[6], date("2025-11-15"));
        for pair in dates.windows(2) {
            assert_eq!(pair[1], pair[0] + Days::new(1));
        }
    }

    #[test]
    fn week_start_crosses_month_boundaries() {
        // 2025-12-02 is a Tuesday; its week starts 2025-11-30.
        assert_eq!(week_start(date("2025-12-02")), date("2025-11-30"));
    }
}
