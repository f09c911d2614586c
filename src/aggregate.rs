use crate::models::{Direction, Metric, MetricCard, PerformanceRecord, PerformanceSummary, Trend};

pub fn sum(records: &[PerformanceRecord], metric: Metric) -> i64 {
    records
        .iter()
        .fold(0i64, |total, record| total.saturating_add(record.metric(metric)))
}

/// Percentage change of `metric` from the prior set to the current one.
pub fn trend(current: &[PerformanceRecord], prior: &[PerformanceRecord], metric: Metric) -> Trend {
    let current_sum = sum(current, metric);
    let prior_sum = sum(prior, metric);

    if prior_sum == 0 {
        return match current_sum {
            0 => Trend {
                label: "0%".to_string(),
                direction: Direction::Neutral,
                is_change: false,
            },
            value => Trend {
                label: "New".to_string(),
                direction: if value > 0 { Direction::Up } else { Direction::Down },
                is_change: true,
            },
        };
    }

    let change = (current_sum as f64 - prior_sum as f64) / prior_sum as f64 * 100.0;
    let direction = if change > 0.0 {
        Direction::Up
    } else if change < 0.0 {
        Direction::Down
    } else {
        Direction::Neutral
    };

    Trend {
        label: format!("{}%", change.abs().round() as i64),
        direction,
        is_change: true,
    }
}

fn percentage(numerator: i64, denominator: i64) -> String {
    if denominator == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", numerator as f64 / denominator as f64 * 100.0)
}

pub fn visit_conversion(calls: i64, done: i64) -> String {
    percentage(done, calls)
}

pub fn close_conversion(done: i64, tokens: i64) -> String {
    percentage(tokens, done)
}

/// Cards for every metric plus the two conversion ratios. Trends are only
/// attached when there is a non-empty prior period to compare against.
pub fn summarize(
    current: &[PerformanceRecord],
    prior: Option<&[PerformanceRecord]>,
) -> PerformanceSummary {
    let comparison = prior.filter(|records| !records.is_empty());

    let cards = Metric::ALL
        .iter()
        .map(|metric| MetricCard {
            metric: *metric,
            value: sum(current, *metric),
            trend: comparison.map(|prior| trend(current, prior, *metric)),
        })
        .collect();

    let calls = sum(current, Metric::Calls);
    let done = sum(current, Metric::Done);
    let tokens = sum(current, Metric::Tokens);

    PerformanceSummary {
        cards,
        visit_conversion: visit_conversion(calls, done),
        close_conversion: close_conversion(done, tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tokens(tokens: i64) -> PerformanceRecord {
        PerformanceRecord {
            date_label: String::new(),
            date: None,
            name: "Asha".to_string(),
            leads: 0,
            calls: 0,
            positive: 0,
            scheduled: 0,
            done: 0,
            tokens,
        }
    }

    #[test]
    fn trend_without_any_activity_is_flat() {
        let result = trend(&[], &[], Metric::Tokens);
        assert_eq!(result.label, "0%");
        assert_eq!(result.direction, Direction::Neutral);
        assert!(!result.is_change);
    }

    #[test]
    fn trend_from_nothing_is_new() {
        let result = trend(&[with_tokens(5)], &[], Metric::Tokens);
        assert_eq!(result.label, "New");
        assert_eq!(result.direction, Direction::Up);
        assert!(result.is_change);
    }

    #[test]
    fn trend_reports_rounded_absolute_change() {
        let down = trend(&[with_tokens(50)], &[with_tokens(100)], Metric::Tokens);
        assert_eq!(down.label, "50%");
        assert_eq!(down.direction, Direction::Down);

        let up = trend(&[with_tokens(5)], &[with_tokens(3)], Metric::Tokens);
        assert_eq!(up.label, "67%");
        assert_eq!(up.direction, Direction::Up);

        let flat = trend(&[with_tokens(4)], &[with_tokens(2), with_tokens(2)], Metric::Tokens);
        assert_eq!(flat.label, "0%");
        assert_eq!(flat.direction, Direction::Neutral);
        assert!(flat.is_change);
    }

    #[test]
    fn conversions_guard_against_zero() {
        assert_eq!(visit_conversion(0, 3), "0%");
        assert_eq!(visit_conversion(8, 3), "37.5%");
        assert_eq!(close_conversion(0, 2), "0%");
        assert_eq!(close_conversion(3, 1), "33.3%");
    }

    #[test]
    fn summary_skips_trends_without_prior_data() {
        let current = vec![with_tokens(2)];

        let plain = summarize(&current, None);
        assert_eq!(plain.cards.len(), Metric::ALL.len());
        assert!(plain.cards.iter().all(|card| card.trend.is_none()));

        let empty_prior = summarize(&current, Some(&[][..]));
        assert!(empty_prior.cards.iter().all(|card| card.trend.is_none()));

        let prior = vec![with_tokens(1)];
        let compared = summarize(&current, Some(prior.as_slice()));
        let tokens = compared
            .cards
            .iter()
            .find(|card| card.metric == Metric::Tokens)
            .unwrap();
        assert_eq!(tokens.value, 2);
        assert_eq!(tokens.trend.as_ref().map(|t| t.label.as_str()), Some("100%"));
    }

    #[test]
    fn sums_saturate_on_oversized_values() {
        let records = [with_tokens(i64::MAX), with_tokens(1)];
        assert_eq!(sum(&records, Metric::Tokens), i64::MAX);

        let result = trend(&records, &[with_tokens(i64::MAX)], Metric::Tokens);
        assert_eq!(result.label, "0%");
    }
}
