use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Badge, LeaderboardEntry, MemberRollup, PerformanceRecord};

pub fn score(tokens: i64, done: i64, scheduled: i64, positive: i64) -> i64 {
    tokens
        .saturating_mul(100)
        .saturating_add(done.saturating_mul(4))
        .saturating_add(scheduled.saturating_mul(2))
        .saturating_add(positive)
}

/// Per-member totals in the order members first appear. Names are grouped
/// exactly as written, so case and whitespace variants stay separate.
pub fn rollup_members(records: &[PerformanceRecord]) -> Vec<MemberRollup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<MemberRollup> = Vec::new();

    for record in records {
        let slot = *index.entry(record.name.as_str()).or_insert_with(|| {
            rollups.push(MemberRollup {
                name: record.name.clone(),
                calls: 0,
                positive: 0,
                scheduled: 0,
                done: 0,
                tokens: 0,
                score: 0,
                conversion: 0.0,
            });
            rollups.len() - 1
        });

        let entry = &mut rollups[slot];
        entry.calls = entry.calls.saturating_add(record.calls);
        entry.positive = entry.positive.saturating_add(record.positive);
        entry.scheduled = entry.scheduled.saturating_add(record.scheduled);
        entry.done = entry.done.saturating_add(record.done);
        entry.tokens = entry.tokens.saturating_add(record.tokens);
    }

    for rollup in rollups.iter_mut() {
        rollup.score = score(rollup.tokens, rollup.done, rollup.scheduled, rollup.positive);
        rollup.conversion = if rollup.done == 0 {
            0.0
        } else {
            rollup.tokens as f64 / rollup.done as f64 * 100.0
        };
    }

    rollups
}

/// Descending on tokens, then done, scheduled, positive and calls.
fn compare_tiers(a: &MemberRollup, b: &MemberRollup) -> Ordering {
    b.tokens
        .cmp(&a.tokens)
        .then_with(|| b.done.cmp(&a.done))
        .then_with(|| b.scheduled.cmp(&a.scheduled))
        .then_with(|| b.positive.cmp(&a.positive))
        .then_with(|| b.calls.cmp(&a.calls))
}

pub fn rank_label(position: usize) -> String {
    match position {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        other => (other + 1).to_string(),
    }
}

pub fn rank_members(rollups: Vec<MemberRollup>) -> Vec<LeaderboardEntry> {
    // Highest raw call count, first seen wins a tie.
    let most_calls = rollups
        .iter()
        .fold(None::<&MemberRollup>, |best, candidate| match best {
            Some(current) if current.calls >= candidate.calls => Some(current),
            _ => Some(candidate),
        })
        .map(|member| member.name.clone());
    let any_closer = rollups.iter().any(|member| member.tokens > 0);

    let mut ranked = rollups;
    ranked.sort_by(compare_tiers);

    ranked
        .into_iter()
        .enumerate()
        .map(|(position, member)| {
            let mut badges = Vec::new();
            if most_calls.as_deref() == Some(member.name.as_str()) {
                badges.push(Badge::MostCalls);
            }
            if any_closer && position == 0 && member.tokens > 0 {
                badges.push(Badge::TopCloser);
            }

            LeaderboardEntry {
                position,
                rank_label: rank_label(position),
                member,
                badges,
            }
        })
        .collect()
}

pub fn build_leaderboard(records: &[PerformanceRecord]) -> Vec<LeaderboardEntry> {
    rank_members(rollup_members(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(
        name: &str,
        calls: i64,
        positive: i64,
        scheduled: i64,
        done: i64,
        tokens: i64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            date_label: "08/05/2024".to_string(),
            date: None,
            name: name.to_string(),
            leads: 0,
            calls,
            positive,
            scheduled,
            done,
            tokens,
        }
    }

    fn names(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.member.name.as_str()).collect()
    }

    #[test]
    fn rollups_group_by_exact_name_in_first_seen_order() {
        let records = vec![
            sample_record("Asha", 5, 1, 1, 1, 0),
            sample_record("Ravi", 2, 0, 0, 0, 0),
            sample_record("Asha", 5, 2, 0, 1, 1),
            sample_record("asha", 1, 0, 0, 0, 0),
            sample_record("Asha ", 1, 0, 0, 0, 0),
        ];
        let rollups = rollup_members(&records);
        let grouped: Vec<&str> = rollups.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(grouped, vec!["Asha", "Ravi", "asha", "Asha "]);

        let asha = &rollups[0];
        assert_eq!((asha.calls, asha.positive, asha.scheduled, asha.done, asha.tokens), (10, 3, 1, 2, 1));
        assert_eq!(asha.score, 100 + 2 * 4 + 2 + 3);
        assert!((asha.conversion - 50.0).abs() < f64::EPSILON);
        assert_eq!(rollups[1].conversion, 0.0);
    }

    #[test]
    fn scheduled_breaks_tie_on_tokens_and_done() {
        let records = vec![
            sample_record("A", 20, 0, 0, 5, 10),
            sample_record("B", 1, 0, 1, 5, 10),
        ];
        let board = build_leaderboard(&records);
        assert_eq!(names(&board), vec!["B", "A"]);
    }

    #[test]
    fn cascade_reaches_calls_and_keeps_group_order_on_full_tie() {
        let records = vec![
            sample_record("Low", 1, 2, 0, 0, 0),
            sample_record("High", 3, 2, 0, 0, 0),
            sample_record("Twin", 3, 2, 0, 0, 0),
        ];
        let board = build_leaderboard(&records);
        assert_eq!(names(&board), vec!["High", "Twin", "Low"]);
    }

    #[test]
    fn most_calls_badge_goes_to_first_highest_caller() {
        let records = vec![
            sample_record("Closer", 4, 0, 0, 1, 3),
            sample_record("Dialer", 9, 0, 0, 0, 0),
            sample_record("Echo", 9, 1, 0, 0, 0),
        ];
        let board = build_leaderboard(&records);
        assert_eq!(names(&board), vec!["Closer", "Echo", "Dialer"]);

        let dialer = board.iter().find(|e| e.member.name == "Dialer").unwrap();
        assert_eq!(dialer.badges, vec![Badge::MostCalls]);
        let echo = board.iter().find(|e| e.member.name == "Echo").unwrap();
        assert!(echo.badges.is_empty());
        assert_eq!(board[0].badges, vec![Badge::TopCloser]);
    }

    #[test]
    fn top_closer_needs_tokens() {
        let records = vec![
            sample_record("Busy", 10, 0, 0, 0, 0),
            sample_record("Quiet", 1, 0, 0, 0, 0),
        ];
        let board = build_leaderboard(&records);
        assert!(board.iter().all(|entry| !entry.badges.contains(&Badge::TopCloser)));
        assert_eq!(board[0].badges, vec![Badge::MostCalls]);
    }

    #[test]
    fn rank_labels_use_medals_for_podium() {
        assert_eq!(rank_label(0), "🥇");
        assert_eq!(rank_label(1), "🥈");
        assert_eq!(rank_label(2), "🥉");
        assert_eq!(rank_label(3), "4");
        assert_eq!(rank_label(10), "11");
    }

    #[test]
    fn oversized_sheet_values_saturate_instead_of_overflowing() {
        assert_eq!(score(100_000_000_000_000_000, 0, 0, 0), i64::MAX);

        let board = build_leaderboard(&[
            sample_record("Asha", 1, 0, 0, 0, i64::MAX),
            sample_record("Asha", 1, 0, 0, 0, 5),
            sample_record("Ravi", 2, 0, 0, 0, 3),
        ]);
        assert_eq!(names(&board), vec!["Asha", "Ravi"]);
        assert_eq!(board[0].member.tokens, i64::MAX);
        assert_eq!(board[0].member.score, i64::MAX);
    }
}
