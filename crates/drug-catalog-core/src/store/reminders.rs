//! Per-user reminder store.

use std::path::Path;

use chrono::NaiveDateTime;

use super::{Repository, StoreError, StoreResult};
use crate::matching::is_due;
use crate::models::MedicationReminder;

/// Reminders for all users; every operation is scoped to one owner.
#[derive(Debug)]
pub struct ReminderStore {
    repo: Repository<MedicationReminder>,
}

impl ReminderStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            repo: Repository::in_memory(),
        }
    }

    pub fn reload(&mut self) -> StoreResult<()> {
        self.repo.reload()
    }

    pub fn get(&self, id: u32) -> Option<&MedicationReminder> {
        self.repo.get(id)
    }

    /// Add a reminder owned by `user_id`.
    pub fn add(&mut self, user_id: u32, mut reminder: MedicationReminder) -> StoreResult<MedicationReminder> {
        if reminder.drug_id == 0 && reminder.drug_name.trim().is_empty() {
            return Err(StoreError::Validation("a drug must be selected".into()));
        }
        reminder.user_id = user_id;
        let reminder = self.repo.insert(reminder)?;
        tracing::info!(user_id, reminder_id = reminder.id, drug = %reminder.drug_name, "Added reminder");
        Ok(reminder)
    }

    /// Update a reminder the user owns. Ownership can't be transferred.
    pub fn update(&mut self, user_id: u32, reminder: &MedicationReminder) -> StoreResult<()> {
        self.ensure_owned(user_id, reminder.id)?;
        self.repo.modify(reminder.id, |existing| {
            existing.drug_id = reminder.drug_id;
            existing.drug_name = reminder.drug_name.clone();
            existing.dosage = reminder.dosage.clone();
            existing.reminder_time = reminder.reminder_time;
            existing.days_of_week = reminder.days_of_week;
            existing.is_active = reminder.is_active;
            existing.notes = reminder.notes.clone();
        })?;
        Ok(())
    }

    pub fn delete(&mut self, user_id: u32, id: u32) -> StoreResult<MedicationReminder> {
        self.ensure_owned(user_id, id)?;
        self.repo
            .remove(id)?
            .ok_or_else(|| StoreError::NotFound(format!("reminder {}", id)))
    }

    /// Active reminders of a user.
    pub fn list_for_user(&self, user_id: u32) -> Vec<&MedicationReminder> {
        self.repo
            .items()
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .collect()
    }

    /// All reminders of a user, paused ones included.
    pub fn all_for_user(&self, user_id: u32) -> Vec<&MedicationReminder> {
        self.repo
            .items()
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    /// Reminders of a user that are due at `now`.
    pub fn due_for_user(&self, user_id: u32, now: NaiveDateTime) -> Vec<&MedicationReminder> {
        self.repo
            .items()
            .iter()
            .filter(|r| r.user_id == user_id && is_due(r, now))
            .collect()
    }

    fn ensure_owned(&self, user_id: u32, id: u32) -> StoreResult<()> {
        match self.repo.get(id) {
            Some(r) if r.user_id == user_id => Ok(()),
            _ => Err(StoreError::NotFound(format!("reminder {} for user {}", id, user_id))),
        }
    }
}
