use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::summarize;
use crate::dates::QuickRange;
use crate::filter::{filter_in_window, filter_records, filter_visits, RangeSelection};
use crate::leaderboard::build_leaderboard;
use crate::models::{
    LeaderboardEntry, PerformanceRecord, PerformanceSummary, VisitRecord, VisitStatus, VisitSummary,
};
use crate::snapshot::{PerformanceSnapshot, VisitSnapshot};
use crate::visits::{sort_by_final_date, summarize_visits};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceControls {
    pub range: RangeSelection,
    pub member: Option<String>,
}

impl Default for PerformanceControls {
    fn default() -> Self {
        Self {
            range: RangeSelection::Quick(QuickRange::Today),
            member: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitControls {
    pub range: RangeSelection,
    pub member: Option<String>,
    pub status: Option<VisitStatus>,
}

impl Default for VisitControls {
    fn default() -> Self {
        Self {
            range: RangeSelection::All,
            member: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceView {
    pub summary: PerformanceSummary,
    pub table: Vec<PerformanceRecord>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitView {
    pub summary: VisitSummary,
    pub table: Vec<VisitRecord>,
}

/// One full recompute over the snapshot: filter, compare against the prior
/// window, summarize and rank. The prior window is always the whole team,
/// even when a member is selected.
pub fn build_performance_view(
    snapshot: &PerformanceSnapshot,
    controls: &PerformanceControls,
    today: NaiveDate,
) -> PerformanceView {
    let member = controls.member.as_deref();
    let current = filter_records(snapshot.records(), &controls.range, member, today);
    let prior = controls
        .range
        .prior_window(today)
        .map(|window| filter_in_window(snapshot.records(), Some(&window), None));

    debug!(
        current = current.len(),
        prior = ?prior.as_ref().map(Vec::len),
        "performance view recomputed"
    );

    PerformanceView {
        summary: summarize(&current, prior.as_deref()),
        leaderboard: build_leaderboard(&current),
        table: current,
    }
}

pub fn build_visit_view(
    snapshot: &VisitSnapshot,
    controls: &VisitControls,
    today: NaiveDate,
) -> VisitView {
    let filtered = filter_visits(
        snapshot.visits(),
        &controls.range,
        controls.member.as_deref(),
        controls.status.as_ref(),
        today,
    );

    VisitView {
        summary: summarize_visits(&filtered),
        table: sort_by_final_date(filtered),
    }
}
