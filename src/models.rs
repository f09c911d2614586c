use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceRecord {
    /// Date text exactly as the feed displayed it.
    pub date_label: String,
    pub date: Option<NaiveDate>,
    pub name: String,
    pub leads: i64,
    pub calls: i64,
    pub positive: i64,
    pub scheduled: i64,
    pub done: i64,
    pub tokens: i64,
}

impl PerformanceRecord {
    pub fn metric(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Leads => self.leads,
            Metric::Calls => self.calls,
            Metric::Positive => self.positive,
            Metric::Scheduled => self.scheduled,
            Metric::Done => self.done,
            Metric::Tokens => self.tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Leads,
    Calls,
    Positive,
    Scheduled,
    Done,
    Tokens,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Leads,
        Metric::Calls,
        Metric::Positive,
        Metric::Scheduled,
        Metric::Done,
        Metric::Tokens,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Leads => "Leads",
            Metric::Calls => "Calls",
            Metric::Positive => "Positive",
            Metric::Scheduled => "Visits Scheduled",
            Metric::Done => "Visits Done",
            Metric::Tokens => "Tokens",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Neutral => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub label: String,
    pub direction: Direction,
    /// False only when both periods sum to zero.
    pub is_change: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub value: i64,
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceSummary {
    pub cards: Vec<MetricCard>,
    pub visit_conversion: String,
    pub close_conversion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRollup {
    pub name: String,
    pub calls: i64,
    pub positive: i64,
    pub scheduled: i64,
    pub done: i64,
    pub tokens: i64,
    pub score: i64,
    pub conversion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    MostCalls,
    TopCloser,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::MostCalls => "📞 Most Calls",
            Badge::TopCloser => "🏆 Top Closer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub rank_label: String,
    pub member: MemberRollup,
    pub badges: Vec<Badge>,
}

/// Derived status of a visit. Anything the sheet holds beyond the four
/// known states is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisitStatus {
    Done,
    Pending,
    Rescheduled,
    Cancelled,
    Other(String),
}

impl VisitStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Done" => VisitStatus::Done,
            "Pending" => VisitStatus::Pending,
            "Rescheduled" => VisitStatus::Rescheduled,
            "Cancelled" => VisitStatus::Cancelled,
            other => VisitStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VisitStatus::Done => "Done",
            VisitStatus::Pending => "Pending",
            VisitStatus::Rescheduled => "Rescheduled",
            VisitStatus::Cancelled => "Cancelled",
            VisitStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a status typed by a user. Known statuses match regardless of
/// case; anything else is kept verbatim.
impl FromStr for VisitStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let known = [
            VisitStatus::Done,
            VisitStatus::Pending,
            VisitStatus::Rescheduled,
            VisitStatus::Cancelled,
        ];
        Ok(known
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .unwrap_or_else(|| VisitStatus::Other(s.to_string())))
    }
}

impl Serialize for VisitStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoneVisit {
    pub entry_date: String,
    pub name: String,
    pub site: String,
    pub time: String,
    pub final_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledVisit {
    pub entry_date: String,
    pub name: String,
    pub site: String,
    pub visit_date: String,
    pub reschedule: String,
    pub status: VisitStatus,
    pub reason: String,
    pub final_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum VisitRecord {
    Done(DoneVisit),
    Scheduled(ScheduledVisit),
}

static DONE_STATUS: VisitStatus = VisitStatus::Done;

impl VisitRecord {
    pub fn name(&self) -> &str {
        match self {
            VisitRecord::Done(visit) => &visit.name,
            VisitRecord::Scheduled(visit) => &visit.name,
        }
    }

    pub fn site(&self) -> &str {
        match self {
            VisitRecord::Done(visit) => &visit.site,
            VisitRecord::Scheduled(visit) => &visit.site,
        }
    }

    pub fn entry_date(&self) -> &str {
        match self {
            VisitRecord::Done(visit) => &visit.entry_date,
            VisitRecord::Scheduled(visit) => &visit.entry_date,
        }
    }

    pub fn status(&self) -> &VisitStatus {
        match self {
            VisitRecord::Done(_) => &DONE_STATUS,
            VisitRecord::Scheduled(visit) => &visit.status,
        }
    }

    pub fn final_date(&self) -> Option<NaiveDate> {
        match self {
            VisitRecord::Done(visit) => visit.final_date,
            VisitRecord::Scheduled(visit) => visit.final_date,
        }
    }

    /// Reschedule date, else visit date, else time of day, else `-`.
    pub fn schedule_label(&self) -> &str {
        let candidates: [&str; 2] = match self {
            VisitRecord::Done(visit) => [visit.time.as_str(), ""],
            VisitRecord::Scheduled(visit) => [visit.reschedule.as_str(), visit.visit_date.as_str()],
        };
        candidates
            .into_iter()
            .find(|value| !value.is_empty())
            .unwrap_or("-")
    }

    pub fn status_label(&self) -> String {
        match self {
            VisitRecord::Scheduled(visit)
                if visit.status == VisitStatus::Cancelled && !visit.reason.is_empty() =>
            {
                format!("Cancelled ({})", visit.reason)
            }
            other => other.status().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
    pub done: usize,
    pub pending: usize,
    pub rescheduled: usize,
    pub cancelled: usize,
    pub scheduled: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(status: VisitStatus, reason: &str) -> VisitRecord {
        VisitRecord::Scheduled(ScheduledVisit {
            entry_date: "01/02/2024".to_string(),
            name: "Priya".to_string(),
            site: "Green Acres".to_string(),
            visit_date: "05/02/2024".to_string(),
            reschedule: String::new(),
            status,
            reason: reason.to_string(),
            final_date: NaiveDate::from_ymd_opt(2024, 2, 5),
        })
    }

    #[test]
    fn status_round_trips_known_and_raw_values() {
        assert_eq!(VisitStatus::from_raw("Pending"), VisitStatus::Pending);
        assert_eq!(
            VisitStatus::from_raw("On Hold"),
            VisitStatus::Other("On Hold".to_string())
        );
        assert_eq!(VisitStatus::from_raw("pending").as_str(), "pending");
        assert_eq!(" Cancelled ".parse::<VisitStatus>(), Ok(VisitStatus::Cancelled));
    }

    #[test]
    fn typed_statuses_ignore_case_for_known_values() {
        assert_eq!("cancelled".parse::<VisitStatus>(), Ok(VisitStatus::Cancelled));
        assert_eq!("PENDING".parse::<VisitStatus>(), Ok(VisitStatus::Pending));
        assert_eq!(
            "on hold".parse::<VisitStatus>(),
            Ok(VisitStatus::Other("on hold".to_string()))
        );
    }

    #[test]
    fn cancelled_status_label_carries_reason() {
        assert_eq!(
            scheduled(VisitStatus::Cancelled, "client travelling").status_label(),
            "Cancelled (client travelling)"
        );
        assert_eq!(scheduled(VisitStatus::Cancelled, "").status_label(), "Cancelled");
        assert_eq!(scheduled(VisitStatus::Pending, "ignored").status_label(), "Pending");
    }

    #[test]
    fn schedule_label_prefers_reschedule_then_visit_date() {
        let visit = scheduled(VisitStatus::Pending, "");
        assert_eq!(visit.schedule_label(), "05/02/2024");

        let done = VisitRecord::Done(DoneVisit {
            entry_date: "01/02/2024".to_string(),
            name: "Priya".to_string(),
            site: "Green Acres".to_string(),
            time: String::new(),
            final_date: None,
        });
        assert_eq!(done.schedule_label(), "-");
        assert_eq!(done.status(), &VisitStatus::Done);
    }
}
