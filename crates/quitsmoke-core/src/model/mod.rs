//! Domain records: the quit record and achievements.

mod achievement;
mod record;

pub use achievement::{Achievement, AchievementKind, NewAchievement};
pub use record::{
    QuitRecord, QuitSettings, DEFAULT_CIGARETTES_PER_DAY, DEFAULT_CIGARETTES_PER_PACK,
    DEFAULT_CURRENCY, DEFAULT_GOAL, DEFAULT_PRICE_PER_PACK, MAX_CIGARETTE_COUNT,
};
