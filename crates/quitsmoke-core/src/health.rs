//! Health recovery timeline.
//!
//! Fixed physiological milestones measured against elapsed time since the
//! quit start. Purely informational: nothing here is persisted or awarded.

use serde::{Deserialize, Serialize};

use crate::stats::ElapsedTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMilestone {
    pub interval: i64,
    pub unit: TimeUnit,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const HEALTH_MILESTONES: &[HealthMilestone] = &[
    HealthMilestone {
        interval: 20,
        unit: TimeUnit::Minute,
        title: "20分後",
        description: "血圧と脈拍が通常のレベルに戻ります。",
        icon: "heart.fill",
    },
    HealthMilestone {
        interval: 12,
        unit: TimeUnit::Hour,
        title: "12時間後",
        description: "血液中の一酸化炭素レベルが正常値に戻ります。",
        icon: "lungs.fill",
    },
    HealthMilestone {
        interval: 24,
        unit: TimeUnit::Hour,
        title: "24時間後",
        description: "心臓発作のリスクが低下し始めます。",
        icon: "heart.circle.fill",
    },
    HealthMilestone {
        interval: 48,
        unit: TimeUnit::Hour,
        title: "48時間後",
        description: "味覚と嗅覚が改善し始めます。",
        icon: "nose.fill",
    },
    HealthMilestone {
        interval: 72,
        unit: TimeUnit::Hour,
        title: "72時間後",
        description: "気管支が緩み、呼吸が楽になります。エネルギーレベルが上昇します。",
        icon: "bolt.fill",
    },
    HealthMilestone {
        interval: 14,
        unit: TimeUnit::Day,
        title: "2週間後",
        description: "循環が改善し、歩行が楽になります。",
        icon: "figure.walk",
    },
    HealthMilestone {
        interval: 30,
        unit: TimeUnit::Day,
        title: "1ヶ月後",
        description: "肺機能が30%改善します。咳や息切れが減少します。",
        icon: "lungs",
    },
    HealthMilestone {
        interval: 90,
        unit: TimeUnit::Day,
        title: "3ヶ月後",
        description: "循環が改善し、肺機能が大幅に向上します。",
        icon: "arrow.up.heart.fill",
    },
    HealthMilestone {
        interval: 180,
        unit: TimeUnit::Day,
        title: "6ヶ月後",
        description: "ストレスに対処しやすくなり、感染症のリスクが減少します。",
        icon: "shield.fill",
    },
    HealthMilestone {
        interval: 365,
        unit: TimeUnit::Day,
        title: "1年後",
        description: "冠動脈疾患のリスクが半分に減少します。",
        icon: "heart.text.square.fill",
    },
];

/// Progress toward one health milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthProgress {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unit: TimeUnit,
    pub interval: i64,
    pub completed: bool,
    /// Units left until the milestone, zero once completed.
    pub remaining: i64,
}

impl HealthProgress {
    /// "あと…" label in the milestone's unit; hours of a day or more are
    /// shown as days and hours.
    pub fn remaining_label(&self) -> String {
        match self.unit {
            TimeUnit::Minute => format!("{}分", self.remaining),
            TimeUnit::Hour if self.remaining >= 24 => {
                format!("{}日{}時間", self.remaining / 24, self.remaining % 24)
            }
            TimeUnit::Hour => format!("{}時間", self.remaining),
            TimeUnit::Day => format!("{}日", self.remaining),
        }
    }
}

impl HealthMilestone {
    fn elapsed_in_unit(&self, elapsed: &ElapsedTime) -> i64 {
        match self.unit {
            TimeUnit::Minute => elapsed.minutes,
            TimeUnit::Hour => elapsed.hours,
            TimeUnit::Day => elapsed.days,
        }
    }

    pub fn progress(&self, elapsed: &ElapsedTime) -> HealthProgress {
        let done = self.elapsed_in_unit(elapsed);
        HealthProgress {
            title: self.title.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            unit: self.unit,
            interval: self.interval,
            completed: done >= self.interval,
            remaining: (self.interval - done).max(0),
        }
    }
}

pub fn health_timeline(elapsed: &ElapsedTime) -> Vec<HealthProgress> {
    HEALTH_MILESTONES.iter().map(|m| m.progress(elapsed)).collect()
}
