use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dates::resolve_date;
use crate::feed::FeedRow;
use crate::ingest::{date_cell, text_cell};
use crate::models::{DoneVisit, ScheduledVisit, VisitRecord, VisitStatus, VisitSummary};

/// Sheets serialise times of day as `Date(1899,11,30,H,M,S)`.
static SERIAL_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Date\(\d+,\d+,\d+,(\d+),(\d+),").expect("time pattern is valid"));

/// Renders a serial time payload on a 12-hour clock. Already readable
/// text is kept as is; blank or unreadable serial payloads become `-`.
pub fn format_visit_time(payload: &str) -> String {
    let payload = payload.trim();
    if payload.is_empty() {
        return "-".to_string();
    }
    if !payload.starts_with("Date(") {
        return payload.to_string();
    }

    SERIAL_TIME
        .captures(payload)
        .and_then(|caps| {
            let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let minute = caps.get(2)?.as_str().parse::<u32>().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        })
        .map(|time| time.format("%I:%M %p").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Done-source columns: date, name, site, time payload. Every row counts.
pub fn ingest_done_rows(rows: &[FeedRow]) -> Vec<VisitRecord> {
    rows.iter()
        .map(|row| {
            let entry_date = date_cell(row, 0);
            VisitRecord::Done(DoneVisit {
                final_date: resolve_date(&entry_date),
                entry_date,
                name: text_cell(row, 1),
                site: text_cell(row, 2),
                time: format_visit_time(&text_cell(row, 3)),
            })
        })
        .collect()
}

fn derive_status(raw_status: &str, reschedule: &str) -> Option<VisitStatus> {
    if raw_status.eq_ignore_ascii_case("done") {
        return None;
    }
    if !reschedule.is_empty() {
        return Some(VisitStatus::Rescheduled);
    }
    if raw_status.eq_ignore_ascii_case("cancel") {
        return Some(VisitStatus::Cancelled);
    }
    Some(VisitStatus::from_raw(raw_status))
}

/// Scheduled-source columns: entry date, name, site, visit date,
/// reschedule date, status, reason. Rows already marked done are dropped
/// because the done source reports them.
pub fn ingest_scheduled_rows(rows: &[FeedRow]) -> Vec<VisitRecord> {
    let mut dropped = 0usize;
    let mut visits = Vec::new();

    for row in rows {
        let entry_date = date_cell(row, 0);
        let visit_date = date_cell(row, 3);
        let reschedule = date_cell(row, 4).trim().to_string();
        let raw_status = text_cell(row, 5);
        let raw_status = match raw_status.trim() {
            "" => "Pending",
            trimmed => trimmed,
        };

        let Some(status) = derive_status(raw_status, &reschedule) else {
            dropped += 1;
            continue;
        };

        let final_date_text = [reschedule.as_str(), visit_date.as_str(), entry_date.as_str()]
            .into_iter()
            .find(|value| !value.trim().is_empty())
            .unwrap_or("");

        visits.push(VisitRecord::Scheduled(ScheduledVisit {
            final_date: resolve_date(final_date_text),
            entry_date,
            name: text_cell(row, 1),
            site: text_cell(row, 2),
            visit_date,
            reschedule,
            status,
            reason: text_cell(row, 6),
        }));
    }

    debug!(kept = visits.len(), dropped, "scheduled visit rows ingested");
    visits
}

/// Done visits first, then scheduled ones, each in feed order.
pub fn merge_visits(done: Vec<VisitRecord>, scheduled: Vec<VisitRecord>) -> Vec<VisitRecord> {
    let mut merged = done;
    merged.extend(scheduled);
    merged
}

pub fn summarize_visits(visits: &[VisitRecord]) -> VisitSummary {
    let count = |status: VisitStatus| {
        visits
            .iter()
            .filter(|visit| *visit.status() == status)
            .count()
    };

    let pending = count(VisitStatus::Pending);
    let rescheduled = count(VisitStatus::Rescheduled);

    VisitSummary {
        done: count(VisitStatus::Done),
        pending,
        rescheduled,
        cancelled: count(VisitStatus::Cancelled),
        scheduled: pending + rescheduled,
        total: visits.len(),
    }
}

/// Ascending by final date. Undated visits sort first; ties keep their
/// merged order.
pub fn sort_by_final_date(mut visits: Vec<VisitRecord>) -> Vec<VisitRecord> {
    visits.sort_by_key(|visit| visit.final_date());
    visits
}
