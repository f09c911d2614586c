use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Named shorthand windows resolved relative to the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuickRange {
    Today,
    Week,
    Month,
}

/// Closed interval on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn spanning(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(start_of_day(date))
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_millisecond =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("23:59:59.999 is a valid time");
    date.and_time(last_millisecond)
}

/// Accepts `yyyy-mm-dd` or `dd/mm/yyyy`. Anything else, or a day that does
/// not exist on the calendar, is `None`.
pub fn resolve_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains('-') {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    }

    if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 3 {
            return None;
        }
        let day = parts[0].trim().parse::<u32>().ok()?;
        let month = parts[1].trim().parse::<u32>().ok()?;
        let year = parts[2].trim().parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

pub fn same_day(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn monday_of(today: NaiveDate) -> NaiveDate {
    // Sunday counts as day 7 so the week always starts on the Monday before it.
    let day = today.weekday().number_from_monday() as i64;
    today - Duration::days(day - 1)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_first
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

pub fn resolve_window(range: QuickRange, today: NaiveDate) -> DateWindow {
    match range {
        QuickRange::Today => DateWindow::spanning(today, today),
        QuickRange::Week => {
            let monday = monday_of(today);
            DateWindow::spanning(monday, monday + Duration::days(6))
        }
        QuickRange::Month => DateWindow::spanning(first_of_month(today), last_of_month(today)),
    }
}

/// The calendar-aligned window immediately before `resolve_window(range, today)`.
pub fn resolve_prior_window(range: QuickRange, today: NaiveDate) -> DateWindow {
    match range {
        QuickRange::Today => {
            let yesterday = today - Duration::days(1);
            DateWindow::spanning(yesterday, yesterday)
        }
        QuickRange::Week => {
            let previous_monday = monday_of(today) - Duration::days(7);
            DateWindow::spanning(previous_monday, previous_monday + Duration::days(6))
        }
        QuickRange::Month => {
            // Day 0 of the current month: the last day of the previous one,
            // which also rolls January back into December of the prior year.
            let previous_last = first_of_month(today) - Duration::days(1);
            DateWindow::spanning(first_of_month(previous_last), previous_last)
        }
    }
}

/// Explicit start/end controls. `None` unless both resolve.
pub fn custom_window(start: &str, end: &str) -> Option<DateWindow> {
    let first = resolve_date(start)?;
    let last = resolve_date(end)?;
    Some(DateWindow::spanning(first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn resolves_both_supported_shapes() {
        assert_eq!(resolve_date("2024-02-01"), Some(date(2024, 2, 1)));
        assert_eq!(resolve_date("01/02/2024"), Some(date(2024, 2, 1)));
        assert_eq!(resolve_date("01/02/2024"), resolve_date("2024-02-01"));
        assert_ne!(resolve_date("01/02/2024"), resolve_date("2024-01-02"));
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(resolve_date(""), None);
        assert_eq!(resolve_date("Feb 1 2024"), None);
        assert_eq!(resolve_date("01/02"), None);
        assert_eq!(resolve_date("31/02/2024"), None);
        assert_eq!(resolve_date("2024-13-01"), None);
        assert_eq!(resolve_date("aa/bb/cccc"), None);
    }

    #[test]
    fn same_day_ignores_missing_sides() {
        let day = Some(date(2024, 5, 6));
        assert!(same_day(day, day));
        assert!(!same_day(day, None));
        assert!(!same_day(None, None));
        assert!(!same_day(day, Some(date(2024, 5, 7))));
    }

    #[test]
    fn today_window_covers_the_whole_day() {
        let window = resolve_window(QuickRange::Today, date(2024, 5, 8));
        assert_eq!(window.start, date(2024, 5, 8).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            date(2024, 5, 8).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn week_window_runs_monday_through_sunday() {
        // 2024-05-08 is a Wednesday.
        let window = resolve_window(QuickRange::Week, date(2024, 5, 8));
        assert_eq!(window.start, start_of_day(date(2024, 5, 6)));
        assert_eq!(window.end, end_of_day(date(2024, 5, 12)));
        assert!(window.contains_date(date(2024, 5, 6)));
        assert!(window.contains_date(date(2024, 5, 12)));
        assert!(window.contains(end_of_day(date(2024, 5, 12))));
        assert!(!window.contains_date(date(2024, 5, 13)));
        assert!(!window.contains_date(date(2024, 5, 5)));
    }

    #[test]
    fn sunday_belongs_to_the_week_that_started_six_days_earlier() {
        let window = resolve_window(QuickRange::Week, date(2024, 5, 12));
        assert_eq!(window.start, start_of_day(date(2024, 5, 6)));
    }

    #[test]
    fn month_window_uses_actual_month_length() {
        let window = resolve_window(QuickRange::Month, date(2024, 2, 14));
        assert_eq!(window.start, start_of_day(date(2024, 2, 1)));
        assert_eq!(window.end, end_of_day(date(2024, 2, 29)));

        let december = resolve_window(QuickRange::Month, date(2023, 12, 31));
        assert_eq!(december.end, end_of_day(date(2023, 12, 31)));
    }

    #[test]
    fn prior_windows_mirror_each_range() {
        let today = date(2024, 3, 6);
        assert_eq!(
            resolve_prior_window(QuickRange::Today, today),
            DateWindow::spanning(date(2024, 3, 5), date(2024, 3, 5))
        );
        assert_eq!(
            resolve_prior_window(QuickRange::Week, today),
            DateWindow::spanning(date(2024, 2, 26), date(2024, 3, 3))
        );
        assert_eq!(
            resolve_prior_window(QuickRange::Month, today),
            DateWindow::spanning(date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn prior_month_rolls_back_into_previous_year() {
        assert_eq!(
            resolve_prior_window(QuickRange::Month, date(2024, 1, 15)),
            DateWindow::spanning(date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn custom_window_needs_both_ends() {
        let window = custom_window("2024-03-01", "10/03/2024").unwrap();
        assert_eq!(window, DateWindow::spanning(date(2024, 3, 1), date(2024, 3, 10)));
        assert_eq!(custom_window("2024-03-01", ""), None);
        assert_eq!(custom_window("garbage", "2024-03-01"), None);
    }
}
