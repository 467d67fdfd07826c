//! Dosing schedules with date ranges and recurrence.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Length of a schedule created without an explicit end date.
pub const DEFAULT_SCHEDULE_DAYS: u64 = 30;

/// Day list meaning "every day of the week".
pub const ALL_WEEKDAYS: &str = "1,2,3,4,5,6,7";

/// How often a schedule recurs within its date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleFrequency {
    Daily,
    /// Same weekday as the start date
    Weekly,
    /// Same day-of-month as the start date
    Monthly,
    /// Weekdays listed in `days_of_week`
    SpecificDays,
    /// Only on the start date
    Once,
}

/// A dosing plan for one drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationSchedule {
    pub id: u32,
    pub user_id: u32,
    pub drug_id: u32,
    pub drug_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time: NaiveTime,
    pub dosage: f64,
    pub dosage_unit: String,
    pub frequency: ScheduleFrequency,
    /// Comma-separated weekday numbers, 1 = Monday .. 7 = Sunday
    pub days_of_week: String,
    pub is_active: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: NaiveDateTime,
    pub last_taken: Option<NaiveDateTime>,
}

impl MedicationSchedule {
    /// A daily 08:00 schedule running for thirty days from `start_date`.
    pub fn new(user_id: u32, drug_id: u32, drug_name: &str, start_date: NaiveDate, created_at: NaiveDateTime) -> Self {
        Self {
            id: 0,
            user_id,
            drug_id,
            drug_name: drug_name.to_string(),
            start_date,
            end_date: start_date
                .checked_add_days(Days::new(DEFAULT_SCHEDULE_DAYS))
                .unwrap_or(NaiveDate::MAX),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            dosage: 0.0,
            dosage_unit: String::new(),
            frequency: ScheduleFrequency::Daily,
            days_of_week: ALL_WEEKDAYS.to_string(),
            is_active: true,
            notes: String::new(),
            created_at,
            last_taken: None,
        }
    }

    /// Weekday numbers parsed from `days_of_week`; unparseable tokens are skipped.
    pub fn weekday_numbers(&self) -> Vec<u32> {
        self.days_of_week
            .split(',')
            .filter_map(|token| token.trim().parse::<u32>().ok())
            .filter(|n| (1..=7).contains(n))
            .collect()
    }

    /// Replace the day list with the given weekdays.
    pub fn set_weekdays(&mut self, days: &[Weekday]) {
        let mut numbers: Vec<u32> = days.iter().map(|d| d.number_from_monday()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        self.days_of_week = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",");
    }

    /// Inclusive, date-only range check.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.drug_name.trim().is_empty() && self.drug_id == 0 {
            return Err("a drug must be selected".into());
        }
        if self.start_date > self.end_date {
            return Err(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            ));
        }
        if self.frequency == ScheduleFrequency::SpecificDays && self.weekday_numbers().is_empty() {
            return Err("select at least one day of the week".into());
        }
        Ok(())
    }
}
