use chrono::{DateTime, Local};
use tracing::info;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::{FeedClient, FeedRow, FeedSource};
use crate::ingest::ingest_performance;
use crate::models::{PerformanceRecord, VisitRecord};
use crate::visits::{ingest_done_rows, ingest_scheduled_rows, merge_visits};

fn distinct_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Every performance record from one fetch. A refresh builds a new
/// snapshot; nothing mutates an existing one.
#[derive(Debug, Clone)]
pub struct PerformanceSnapshot {
    records: Vec<PerformanceRecord>,
    fetched_at: DateTime<Local>,
}

impl PerformanceSnapshot {
    pub fn from_rows(rows: &[FeedRow]) -> Self {
        Self {
            records: ingest_performance(rows),
            fetched_at: Local::now(),
        }
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    /// Non-empty member names in first-seen order.
    pub fn members(&self) -> Vec<String> {
        distinct_names(
            self.records
                .iter()
                .map(|record| record.name.as_str())
                .filter(|name| !name.is_empty()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct VisitSnapshot {
    visits: Vec<VisitRecord>,
    fetched_at: DateTime<Local>,
}

impl VisitSnapshot {
    pub fn from_rows(done_rows: &[FeedRow], scheduled_rows: &[FeedRow]) -> Self {
        Self {
            visits: merge_visits(
                ingest_done_rows(done_rows),
                ingest_scheduled_rows(scheduled_rows),
            ),
            fetched_at: Local::now(),
        }
    }

    pub fn visits(&self) -> &[VisitRecord] {
        &self.visits
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn members(&self) -> Vec<String> {
        distinct_names(self.visits.iter().map(|visit| visit.name()))
    }
}

pub async fn load_performance(
    client: &FeedClient,
    feeds: &FeedConfig,
) -> Result<PerformanceSnapshot, FeedError> {
    let rows = client
        .fetch(&FeedSource::from_location(&feeds.performance))
        .await?;
    let snapshot = PerformanceSnapshot::from_rows(&rows);
    info!(
        records = snapshot.records().len(),
        fetched_at = %snapshot.fetched_at(),
        "performance snapshot ready"
    );
    Ok(snapshot)
}

/// The done feed is authoritative, so the scheduled feed is only requested
/// once it has loaded.
pub async fn load_visits(
    client: &FeedClient,
    feeds: &FeedConfig,
) -> Result<VisitSnapshot, FeedError> {
    let done_rows = client
        .fetch(&FeedSource::from_location(&feeds.visits_done))
        .await?;
    let scheduled_rows = client
        .fetch(&FeedSource::from_location(&feeds.visits_scheduled))
        .await?;

    let snapshot = VisitSnapshot::from_rows(&done_rows, &scheduled_rows);
    info!(
        visits = snapshot.visits().len(),
        fetched_at = %snapshot.fetched_at(),
        "visit snapshot ready"
    );
    Ok(snapshot)
}
