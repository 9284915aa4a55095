use std::collections::BTreeMap;

use super::{Reminder, ReminderScheduler};
use crate::error::SchedulingError;

/// In-process scheduler that only records what it was asked to do.
#[derive(Debug, Clone)]
pub struct MemoryScheduler {
    granted: bool,
    pending: BTreeMap<String, Reminder>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self {
            granted: true,
            pending: BTreeMap::new(),
        }
    }

    /// A scheduler whose permission prompt is always refused.
    pub fn denied() -> Self {
        Self {
            granted: false,
            pending: BTreeMap::new(),
        }
    }

    /// Change the answer to later permission prompts.
    pub fn set_granted(&mut self, granted: bool) {
        self.granted = granted;
    }
}

impl Default for MemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderScheduler for MemoryScheduler {
    fn request_permission(&mut self) -> Result<bool, SchedulingError> {
        Ok(self.granted)
    }

    fn schedule(&mut self, reminder: &Reminder) -> Result<(), SchedulingError> {
        if !self.granted {
            return Err(SchedulingError::PermissionDenied);
        }
        self.pending.insert(reminder.id.clone(), reminder.clone());
        Ok(())
    }

    fn cancel(&mut self, id: &str) -> Result<(), SchedulingError> {
        self.pending.remove(id);
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), SchedulingError> {
        self.pending.clear();
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Reminder>, SchedulingError> {
        let mut reminders: Vec<Reminder> = self.pending.values().cloned().collect();
        reminders.sort_by_key(|r| r.trigger_at);
        Ok(reminders)
    }
}
