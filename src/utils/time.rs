use chrono::{Duration, Local, NaiveDate};

pub const API_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DECK_DATE_FORMAT: &str = "%d/%m/%Y";

/// Date range a report covers, inclusive of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl ReportWindow {
    /// The `days` days leading up to and including `end`.
    pub fn ending(end: NaiveDate, days: i64) -> Self {
        Self {
            min_date: end - Duration::days(days.max(0)),
            max_date: end,
        }
    }

    pub fn min_param(&self) -> String {
        self.min_date.format(API_DATE_FORMAT).to_string()
    }

    pub fn max_param(&self) -> String {
        self.max_date.format(API_DATE_FORMAT).to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Date as written into deck placeholders.
pub fn deck_date(date: NaiveDate) -> String {
    date.format(DECK_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ending() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let window = ReportWindow::ending(end, 7);
        assert_eq!(window.min_param(), "2025-02-26");
        assert_eq!(window.max_param(), "2025-03-05");
    }

    #[test]
    fn test_negative_days_clamped() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let window = ReportWindow::ending(end, -3);
        assert_eq!(window.min_date, window.max_date);
    }

    #[test]
    fn test_deck_date() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        assert_eq!(deck_date(date), "30/09/2024");
    }
}
