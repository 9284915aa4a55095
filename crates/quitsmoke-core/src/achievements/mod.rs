//! Milestone detection.
//!
//! Achievements are a ratchet: a milestone whose title is already recorded is
//! never emitted again, and nothing here ever removes a recorded one when the
//! metrics drop (for example after moving the quit date forward).

mod milestones;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use milestones::{Milestone, MILESTONES};

use crate::model::{Achievement, AchievementKind, NewAchievement};
use crate::stats::Statistics;

/// Milestones crossed by `stats` that have no recorded achievement yet.
///
/// Output follows table order: time, money, cigarettes, each ladder from the
/// lowest threshold up. Calling again with the returned entries added to
/// `existing` yields an empty list.
pub fn detect_new(
    stats: &Statistics,
    currency: &str,
    existing: &[Achievement],
) -> Vec<NewAchievement> {
    let mut seen: HashSet<String> = existing.iter().map(|a| a.title.clone()).collect();

    MILESTONES
        .iter()
        .filter(|m| m.is_reached(stats))
        .filter_map(|m| {
            let title = m.render_title(currency);
            if !seen.insert(title.clone()) {
                return None;
            }
            Some(NewAchievement {
                kind: m.kind,
                title,
                detail: m.render_detail(currency),
                icon_name: m.icon.to_string(),
            })
        })
        .collect()
}

/// A milestone together with its recorded achievement, if earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub kind: AchievementKind,
    pub threshold: f64,
    pub title: String,
    pub detail: String,
    pub icon_name: String,
    pub earned: Option<Achievement>,
}

/// Every milestone in table order.
pub fn catalogue(currency: &str, existing: &[Achievement]) -> Vec<CatalogueEntry> {
    MILESTONES
        .iter()
        .map(|m| {
            let title = m.render_title(currency);
            let earned = existing.iter().find(|a| a.title == title).cloned();
            CatalogueEntry {
                kind: m.kind,
                threshold: m.threshold,
                detail: m.render_detail(currency),
                icon_name: m.icon.to_string(),
                title,
                earned,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{statistics_for, ElapsedTime};
    use chrono::Utc;

    fn stats_for_days(days: i64) -> Statistics {
        let elapsed = ElapsedTime {
            days,
            hours: days * 24,
            minutes: days * 24 * 60,
        };
        statistics_for(elapsed, 20, 500.0, 20).unwrap()
    }

    fn titles(found: &[NewAchievement]) -> Vec<&str> {
        found.iter().map(|a| a.title.as_str()).collect()
    }

    fn stamp(found: Vec<NewAchievement>) -> Vec<Achievement> {
        let now = Utc::now();
        found.into_iter().map(|a| a.into_achievement(now)).collect()
    }

    #[test]
    fn nothing_before_first_day() {
        assert!(detect_new(&stats_for_days(0), "¥", &[]).is_empty());
    }

    #[test]
    fn eight_days_stops_below_next_rungs() {
        // 8 days * 20/day = 160 cigarettes, 4000 saved.
        let found = detect_new(&stats_for_days(8), "¥", &[]);
        assert_eq!(
            titles(&found),
            vec!["1日達成", "3日達成", "1週間達成", "1,000¥節約", "100本達成"]
        );
    }

    #[test]
    fn second_call_is_empty() {
        let stats = stats_for_days(12);
        let first = detect_new(&stats, "¥", &[]);
        assert!(!first.is_empty());

        let existing = stamp(first);
        assert!(detect_new(&stats, "¥", &existing).is_empty());
    }

    #[test]
    fn ladders_emit_low_to_high() {
        let found = detect_new(&stats_for_days(400), "円", &[]);
        assert_eq!(
            titles(&found),
            vec![
                "1日達成",
                "3日達成",
                "1週間達成",
                "1ヶ月達成",
                "1,000円節約",
                "5,000円節約",
                "1万円節約",
                "5万円節約",
                "10万円節約",
                "100本達成",
                "500本達成",
            ]
        );
        assert_eq!(found[4].kind, AchievementKind::Money);
        assert_eq!(found[4].icon_name, "yensign.circle");
    }

    #[test]
    fn regression_never_revokes_and_only_adds_missing() {
        let existing = stamp(detect_new(&stats_for_days(3), "¥", &[]));
        // Quit date moved forward: metrics drop to zero.
        assert!(detect_new(&stats_for_days(0), "¥", &existing).is_empty());
        // Later progress only adds what is missing.
        // 7 days: 140 cigarettes, 3500 saved.
        let found = detect_new(&stats_for_days(7), "¥", &existing);
        assert_eq!(titles(&found), vec!["1週間達成", "100本達成"]);
    }

    #[test]
    fn thresholds_are_inclusive() {
        // Exactly 1000 saved: 2 days * 20 = 40 cigs at 25/cig.
        let elapsed = ElapsedTime {
            days: 2,
            hours: 48,
            minutes: 2880,
        };
        let stats = statistics_for(elapsed, 20, 500.0, 20).unwrap();
        assert_eq!(stats.money_saved, 1000.0);
        let found = detect_new(&stats, "¥", &[]);
        assert!(titles(&found).contains(&"1,000¥節約"));
    }

    #[test]
    fn catalogue_marks_earned_entries() {
        let existing = stamp(detect_new(&stats_for_days(1), "¥", &[]));
        let entries = catalogue("¥", &existing);
        assert_eq!(entries.len(), MILESTONES.len());
        assert!(entries[0].earned.is_some());
        assert!(entries[1].earned.is_none());
    }
}
