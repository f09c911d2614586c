use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::dashboard::{PerformanceView, VisitView};
use crate::dates::{same_day, QuickRange};
use crate::filter::RangeSelection;
use crate::models::{Direction, PerformanceRecord};

pub fn describe_range(range: &RangeSelection, today: NaiveDate) -> String {
    match range {
        RangeSelection::All => "all dates".to_string(),
        RangeSelection::Quick(quick) => {
            let label = match quick {
                QuickRange::Today => "today",
                QuickRange::Week => "this week",
                QuickRange::Month => "this month",
            };
            match range.window(today) {
                Some(window) if same_day(Some(window.start.date()), Some(window.end.date())) => {
                    format!("{} ({})", label, window.start.date())
                }
                Some(window) => format!(
                    "{} ({} to {})",
                    label,
                    window.start.date(),
                    window.end.date()
                ),
                None => label.to_string(),
            }
        }
        RangeSelection::Custom(window) => {
            format!("{} to {}", window.start.date(), window.end.date())
        }
    }
}

pub fn render_feed_error(title: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", title);
    let _ = writeln!(output, "Unable to load data");
    output
}

pub fn render_performance(view: &PerformanceView, scope: &str, member: Option<&str>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Team Performance");
    let _ = writeln!(
        output,
        "Showing {} for {}",
        member.filter(|name| !name.is_empty()).unwrap_or("all members"),
        scope
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");

    for card in view.summary.cards.iter() {
        match &card.trend {
            Some(trend) => {
                let arrow = match trend.direction {
                    Direction::Neutral if !trend.is_change => "—",
                    direction => direction.arrow(),
                };
                let _ = writeln!(
                    output,
                    "- {}: {} ({} {})",
                    card.metric.label(),
                    card.value,
                    arrow,
                    trend.label
                );
            }
            None => {
                let _ = writeln!(output, "- {}: {}", card.metric.label(), card.value);
            }
        }
    }
    let _ = writeln!(output, "- Visit Conversion: {}", view.summary.visit_conversion);
    let _ = writeln!(output, "- Close Conversion: {}", view.summary.close_conversion);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Records");

    if view.table.is_empty() {
        let _ = writeln!(output, "No data found");
    } else {
        let _ = writeln!(
            output,
            "| Date | Name | Leads | Calls | Positive | Scheduled | Done | Tokens |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
        for record in view.table.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} |",
                record.date_label,
                record.name,
                record.leads,
                record.calls,
                record.positive,
                record.scheduled,
                record.done,
                record.tokens
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Leaderboard");

    if view.leaderboard.is_empty() {
        let _ = writeln!(output, "No data");
    } else {
        let _ = writeln!(output, "| Rank | Name | Calls | Positive | Scheduled | Done | Tokens |");
        let _ = writeln!(output, "|---|---|---|---|---|---|---|");
        for entry in view.leaderboard.iter() {
            let badges: Vec<&str> = entry.badges.iter().map(|badge| badge.label()).collect();
            let name = if badges.is_empty() {
                entry.member.name.clone()
            } else {
                format!("{} ({})", entry.member.name, badges.join(", "))
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} |",
                entry.rank_label,
                name,
                entry.member.calls,
                entry.member.positive,
                entry.member.scheduled,
                entry.member.done,
                entry.member.tokens
            );
        }
    }

    output
}

pub fn render_visits(view: &VisitView, scope: &str) -> String {
    let mut output = String::new();
    let summary = &view.summary;

    let _ = writeln!(output, "# Site Visits");
    let _ = writeln!(output, "Showing {}", scope);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Done: {}", summary.done);
    let _ = writeln!(output, "- Scheduled: {}", summary.scheduled);
    let _ = writeln!(output, "- Pending: {}", summary.pending);
    let _ = writeln!(output, "- Rescheduled: {}", summary.rescheduled);
    let _ = writeln!(output, "- Cancelled: {}", summary.cancelled);
    let _ = writeln!(output, "- Total: {}", summary.total);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Visits");

    if view.table.is_empty() {
        let _ = writeln!(output, "No visits found");
        return output;
    }

    let _ = writeln!(output, "| Entry | Name | Site | Schedule | Status |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for visit in view.table.iter() {
        let entry_date = match visit.entry_date() {
            "" => "-",
            value => value,
        };
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            entry_date,
            visit.name(),
            visit.site(),
            visit.schedule_label(),
            visit.status_label()
        );
    }

    output
}

pub fn render_json<T: Serialize>(view: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(view).context("failed to serialize view")
}

/// Writes the record table as CSV with a header row.
pub fn export_records_csv(records: &[PerformanceRecord], path: &Path) -> anyhow::Result<usize> {
    #[derive(Serialize)]
    struct CsvRow<'a> {
        date: &'a str,
        name: &'a str,
        leads: i64,
        calls: i64,
        positive: i64,
        scheduled: i64,
        done: i64,
        tokens: i64,
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for record in records {
        writer.serialize(CsvRow {
            date: &record.date_label,
            name: &record.name,
            leads: record.leads,
            calls: record.calls,
            positive: record.positive,
            scheduled: record.scheduled,
            done: record.done,
            tokens: record.tokens,
        })?;
    }
    writer.flush()?;

    Ok(records.len())
}
