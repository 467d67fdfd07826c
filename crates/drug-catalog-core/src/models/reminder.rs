//! Weekly medication reminders.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A per-user reminder to take a drug at a time of day on selected weekdays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationReminder {
    pub id: u32,
    /// Owner of the reminder
    pub user_id: u32,
    pub drug_id: u32,
    /// Fallback when `drug_id` no longer resolves
    pub drug_name: String,
    /// Free text, e.g. "2 tablets". The leading number is used for stock deduction.
    pub dosage: String,
    pub reminder_time: NaiveTime,
    /// Index 0 = Monday .. 6 = Sunday
    pub days_of_week: [bool; 7],
    pub is_active: bool,
    #[serde(default)]
    pub notes: String,
}

impl MedicationReminder {
    /// Create an active reminder with no weekdays selected.
    pub fn new(user_id: u32, drug_id: u32, drug_name: &str, dosage: &str, reminder_time: NaiveTime) -> Self {
        Self {
            id: 0,
            user_id,
            drug_id,
            drug_name: drug_name.to_string(),
            dosage: dosage.to_string(),
            reminder_time,
            days_of_week: [false; 7],
            is_active: true,
            notes: String::new(),
        }
    }

    /// Builder-style weekday selection.
    pub fn on_days(mut self, days: &[Weekday]) -> Self {
        for day in days {
            self.days_of_week[weekday_index(*day)] = true;
        }
        self
    }

    pub fn every_day(mut self) -> Self {
        self.days_of_week = [true; 7];
        self
    }

    pub fn is_scheduled_on(&self, day: Weekday) -> bool {
        self.days_of_week[weekday_index(day)]
    }

    pub fn has_any_day(&self) -> bool {
        self.days_of_week.iter().any(|d| *d)
    }
}

/// Monday-first weekday index, independent of host locale.
pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}
