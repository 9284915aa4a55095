use super::{RecordStore, SettingsStore};
use crate::error::StorageError;
use crate::model::{Achievement, QuitRecord};

/// In-process record store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<QuitRecord>,
    achievements: Vec<Achievement>,
    first_launch: Option<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn active_record(&self) -> Result<Option<QuitRecord>, StorageError> {
        Ok(self.record.clone())
    }

    fn save_record(&mut self, record: &QuitRecord) -> Result<(), StorageError> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn delete_all_records(&mut self) -> Result<(), StorageError> {
        self.record = None;
        Ok(())
    }

    fn list_achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        let mut listed: Vec<Achievement> = self.achievements.iter().rev().cloned().collect();
        // Stable sort keeps later appends first among equal dates.
        listed.sort_by(|a, b| b.achieved_date.cmp(&a.achieved_date));
        Ok(listed)
    }

    fn append_achievement(&mut self, achievement: &Achievement) -> Result<(), StorageError> {
        if !self.achievements.iter().any(|a| a.title == achievement.title) {
            self.achievements.push(achievement.clone());
        }
        Ok(())
    }

    fn delete_all_achievements(&mut self) -> Result<(), StorageError> {
        self.achievements.clear();
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn is_first_launch(&self) -> Result<bool, StorageError> {
        Ok(self.first_launch.unwrap_or(true))
    }

    fn set_first_launch(&mut self, first_launch: bool) -> Result<(), StorageError> {
        self.first_launch = Some(first_launch);
        Ok(())
    }
}
