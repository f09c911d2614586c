//! Normalization of raw feed rows into typed records.
//!
//! Coercion table, applied per column:
//!
//! | kind   | source                                   | fallback |
//! |--------|------------------------------------------|----------|
//! | date   | formatted string, else raw value as text | `""`     |
//! | text   | raw value as text                        | `""`     |
//! | number | raw number, or raw text parsed as number | `0`      |
//!
//! Performance feed columns: date, name, leads, calls, positive,
//! scheduled, done, tokens.

use serde_json::Value;
use tracing::debug;

use crate::dates::resolve_date;
use crate::feed::FeedRow;
use crate::models::PerformanceRecord;

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

pub fn date_cell(row: &FeedRow, index: usize) -> String {
    let Some(cell) = row.cell(index) else {
        return String::new();
    };

    match cell.formatted.as_deref() {
        Some(formatted) if !formatted.is_empty() => formatted.to_string(),
        _ => cell.raw.as_ref().map(value_text).unwrap_or_default(),
    }
}

pub fn text_cell(row: &FeedRow, index: usize) -> String {
    row.cell(index)
        .and_then(|cell| cell.raw.as_ref())
        .map(value_text)
        .unwrap_or_default()
}

pub fn number_cell(row: &FeedRow, index: usize) -> i64 {
    let number = match row.cell(index).and_then(|cell| cell.raw.as_ref()) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|value| value.is_finite())
        .map(|value| value as i64)
        .unwrap_or(0)
}

pub fn ingest_performance(rows: &[FeedRow]) -> Vec<PerformanceRecord> {
    let records: Vec<PerformanceRecord> = rows
        .iter()
        .map(|row| {
            let date_label = date_cell(row, 0);
            PerformanceRecord {
                date: resolve_date(&date_label),
                date_label,
                name: text_cell(row, 1),
                leads: number_cell(row, 2),
                calls: number_cell(row, 3),
                positive: number_cell(row, 4),
                scheduled: number_cell(row, 5),
                done: number_cell(row, 6),
                tokens: number_cell(row, 7),
            }
        })
        .collect();

    let undated = records.iter().filter(|record| record.date.is_none()).count();
    debug!(records = records.len(), undated, "performance rows ingested");
    records
}
