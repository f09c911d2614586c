use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::dates::{custom_window, resolve_prior_window, resolve_window, DateWindow, QuickRange};
use crate::models::{PerformanceRecord, VisitRecord, VisitStatus};

/// Anything the filter engine can place on the calendar and attribute to a
/// member.
pub trait Filterable {
    fn calendar_date(&self) -> Option<NaiveDate>;
    fn member(&self) -> &str;
}

impl Filterable for PerformanceRecord {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn member(&self) -> &str {
        &self.name
    }
}

impl Filterable for VisitRecord {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.final_date()
    }

    fn member(&self) -> &str {
        self.name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    All,
    Quick(QuickRange),
    Custom(DateWindow),
}

impl RangeSelection {
    /// A custom range needs both ends and wins over the quick range.
    pub fn from_controls(
        quick: Option<QuickRange>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Self {
        let start = start.map(str::trim).filter(|value| !value.is_empty());
        let end = end.map(str::trim).filter(|value| !value.is_empty());

        if let (Some(start), Some(end)) = (start, end) {
            match custom_window(start, end) {
                Some(window) => return RangeSelection::Custom(window),
                None => warn!(start, end, "ignoring custom range with unreadable dates"),
            }
        }

        match quick {
            Some(range) => RangeSelection::Quick(range),
            None => RangeSelection::All,
        }
    }

    pub fn window(&self, today: NaiveDate) -> Option<DateWindow> {
        match self {
            RangeSelection::All => None,
            RangeSelection::Quick(range) => Some(resolve_window(*range, today)),
            RangeSelection::Custom(window) => Some(*window),
        }
    }

    /// Only quick ranges have a comparable prior period.
    pub fn prior_window(&self, today: NaiveDate) -> Option<DateWindow> {
        match self {
            RangeSelection::Quick(range) => Some(resolve_prior_window(*range, today)),
            _ => None,
        }
    }
}

fn in_window<T: Filterable>(record: &T, window: Option<&DateWindow>) -> bool {
    match window {
        None => true,
        Some(window) => record
            .calendar_date()
            .map(|date| window.contains_date(date))
            .unwrap_or(false),
    }
}

fn matches_member<T: Filterable>(record: &T, member: Option<&str>) -> bool {
    match member {
        Some(name) if !name.is_empty() => record.member() == name,
        _ => true,
    }
}

/// Records inside `window` (all records when `None`) that belong to
/// `member` (everyone when `None` or empty).
pub fn filter_in_window<T: Filterable + Clone>(
    records: &[T],
    window: Option<&DateWindow>,
    member: Option<&str>,
) -> Vec<T> {
    let filtered: Vec<T> = records
        .iter()
        .filter(|record| in_window(*record, window))
        .filter(|record| matches_member(*record, member))
        .cloned()
        .collect();

    debug!(input = records.len(), output = filtered.len(), "records filtered");
    filtered
}

pub fn filter_records<T: Filterable + Clone>(
    records: &[T],
    selection: &RangeSelection,
    member: Option<&str>,
    today: NaiveDate,
) -> Vec<T> {
    let window = selection.window(today);
    filter_in_window(records, window.as_ref(), member)
}

pub fn filter_visits(
    visits: &[VisitRecord],
    selection: &RangeSelection,
    member: Option<&str>,
    status: Option<&VisitStatus>,
    today: NaiveDate,
) -> Vec<VisitRecord> {
    let mut filtered = filter_records(visits, selection, member, today);
    if let Some(status) = status {
        filtered.retain(|visit| visit.status() == status);
    }
    filtered
}
