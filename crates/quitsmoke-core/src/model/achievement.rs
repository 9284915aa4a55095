use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milestone category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Time,
    Money,
    Cigarettes,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::Time => "time",
            AchievementKind::Money => "money",
            AchievementKind::Cigarettes => "cigarettes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "time" => Some(AchievementKind::Time),
            "money" => Some(AchievementKind::Money),
            "cigarettes" => Some(AchievementKind::Cigarettes),
            _ => None,
        }
    }
}

impl std::fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// "Milestone `title` was reached at `achieved_date`".
///
/// Immutable once created. `title` is the identity of the milestone: at most
/// one achievement per title ever exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub title: String,
    pub detail: String,
    pub icon_name: String,
    pub achieved_date: DateTime<Utc>,
}

/// A crossed milestone that has not been stamped with an id and date yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAchievement {
    pub kind: AchievementKind,
    pub title: String,
    pub detail: String,
    pub icon_name: String,
}

impl NewAchievement {
    pub fn into_achievement(self, achieved_date: DateTime<Utc>) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            kind: self.kind,
            title: self.title,
            detail: self.detail,
            icon_name: self.icon_name,
            achieved_date,
        }
    }
}
