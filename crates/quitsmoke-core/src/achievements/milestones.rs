//! The milestone table.
//!
//! `{currency}` in a title or detail is replaced with the record's currency
//! label when rendered.

use crate::model::AchievementKind;
use crate::stats::Statistics;

/// One rung of a milestone ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestone {
    pub kind: AchievementKind,
    pub threshold: f64,
    pub title: &'static str,
    pub detail: &'static str,
    pub icon: &'static str,
}

const fn milestone(
    kind: AchievementKind,
    threshold: f64,
    title: &'static str,
    detail: &'static str,
    icon: &'static str,
) -> Milestone {
    Milestone {
        kind,
        threshold,
        title,
        detail,
        icon,
    }
}

/// Ladder order is time, money, cigarettes; thresholds ascend within a ladder.
pub const MILESTONES: &[Milestone] = &[
    milestone(
        AchievementKind::Time,
        1.0,
        "1日達成",
        "禁煙を1日続けました",
        "clock.badge.checkmark",
    ),
    milestone(
        AchievementKind::Time,
        3.0,
        "3日達成",
        "禁煙を3日続けました",
        "clock.badge.checkmark.fill",
    ),
    milestone(
        AchievementKind::Time,
        7.0,
        "1週間達成",
        "禁煙を1週間続けました",
        "calendar.badge.checkmark",
    ),
    milestone(
        AchievementKind::Time,
        30.0,
        "1ヶ月達成",
        "禁煙を1ヶ月続けました",
        "calendar.badge.clock",
    ),
    milestone(
        AchievementKind::Money,
        1_000.0,
        "1,000{currency}節約",
        "タバコを我慢して1,000{currency}節約しました",
        "yensign.circle",
    ),
    milestone(
        AchievementKind::Money,
        5_000.0,
        "5,000{currency}節約",
        "タバコを我慢して5,000{currency}節約しました",
        "yensign.circle.fill",
    ),
    milestone(
        AchievementKind::Money,
        10_000.0,
        "1万{currency}節約",
        "タバコを我慢して1万{currency}節約しました",
        "banknote",
    ),
    milestone(
        AchievementKind::Money,
        50_000.0,
        "5万{currency}節約",
        "タバコを我慢して5万{currency}節約しました",
        "banknote.fill",
    ),
    milestone(
        AchievementKind::Money,
        100_000.0,
        "10万{currency}節約",
        "タバコを我慢して10万{currency}節約しました",
        "creditcard",
    ),
    milestone(
        AchievementKind::Cigarettes,
        100.0,
        "100本達成",
        "100本のタバコを吸わずに済みました",
        "lungs",
    ),
    milestone(
        AchievementKind::Cigarettes,
        500.0,
        "500本達成",
        "500本のタバコを吸わずに済みました",
        "lungs.fill",
    ),
];

impl Milestone {
    pub fn render_title(&self, currency: &str) -> String {
        self.title.replace("{currency}", currency)
    }

    pub fn render_detail(&self, currency: &str) -> String {
        self.detail.replace("{currency}", currency)
    }

    /// The live metric this milestone's ladder is measured against.
    pub fn metric(&self, stats: &Statistics) -> f64 {
        match self.kind {
            AchievementKind::Time => stats.elapsed.days as f64,
            AchievementKind::Money => stats.money_saved,
            AchievementKind::Cigarettes => stats.cigarettes_avoided as f64,
        }
    }

    pub fn is_reached(&self, stats: &Statistics) -> bool {
        self.metric(stats) >= self.threshold
    }
}
