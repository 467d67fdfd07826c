//! Dosing schedule store.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Repository, StoreError, StoreResult};
use crate::matching::{doses_on, project, ScheduledDose};
use crate::models::MedicationSchedule;

/// Dosing schedules for all users.
#[derive(Debug)]
pub struct ScheduleStore {
    repo: Repository<MedicationSchedule>,
}

impl ScheduleStore {
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

    pub fn get(&self, id: u32) -> Option<&MedicationSchedule> {
        self.repo.get(id)
    }

    pub fn user_schedules(&self, user_id: u32) -> Vec<&MedicationSchedule> {
        self.repo
            .items()
            .iter()
            .filter(|s| s.user_id == user_id)
            .collect()
    }

    /// Active schedules whose date range covers `today`.
    pub fn active_schedules(&self, user_id: u32, today: NaiveDate) -> Vec<&MedicationSchedule> {
        self.repo
            .items()
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active && s.covers(today))
            .collect()
    }

    /// Doses due today, ordered by time of day.
    pub fn todays_schedules(&self, user_id: u32, today: NaiveDate) -> Vec<ScheduledDose> {
        doses_on(self.active_schedules(user_id, today), today)
    }

    /// Doses over `[today, today + days]`, ordered by date then time.
    pub fn upcoming(&self, user_id: u32, today: NaiveDate, days: u32) -> Vec<ScheduledDose> {
        project(self.user_schedules(user_id), today, days)
    }

    pub fn add(&mut self, user_id: u32, mut schedule: MedicationSchedule) -> StoreResult<MedicationSchedule> {
        schedule.validate().map_err(StoreError::Validation)?;
        schedule.user_id = user_id;
        let schedule = self.repo.insert(schedule)?;
        tracing::info!(user_id, schedule_id = schedule.id, frequency = ?schedule.frequency, "Added schedule");
        Ok(schedule)
    }

    /// Replace the editable fields of a stored schedule.
    pub fn update(&mut self, schedule: &MedicationSchedule) -> StoreResult<()> {
        schedule.validate().map_err(StoreError::Validation)?;
        self.repo
            .modify(schedule.id, |existing| {
                existing.drug_id = schedule.drug_id;
                existing.drug_name = schedule.drug_name.clone();
                existing.start_date = schedule.start_date;
                existing.end_date = schedule.end_date;
                existing.time = schedule.time;
                existing.dosage = schedule.dosage;
                existing.dosage_unit = schedule.dosage_unit.clone();
                existing.frequency = schedule.frequency;
                existing.days_of_week = schedule.days_of_week.clone();
                existing.is_active = schedule.is_active;
                existing.notes = schedule.notes.clone();
            })?
            .ok_or_else(|| StoreError::NotFound(format!("schedule {}", schedule.id)))
    }

    pub fn delete(&mut self, id: u32) -> StoreResult<MedicationSchedule> {
        self.repo
            .remove(id)?
            .ok_or_else(|| StoreError::NotFound(format!("schedule {}", id)))
    }

    pub fn mark_taken(&mut self, id: u32, taken_at: NaiveDateTime) -> StoreResult<()> {
        self.repo
            .modify(id, |s| s.last_taken = Some(taken_at))?
            .ok_or_else(|| StoreError::NotFound(format!("schedule {}", id)))?;
        tracing::info!(schedule_id = id, taken_at = %taken_at, "Dose marked as taken");
        Ok(())
    }

    pub fn has_schedule_for_drug(&self, user_id: u32, drug_id: u32) -> bool {
        self.repo
            .items()
            .iter()
            .any(|s| s.user_id == user_id && s.drug_id == drug_id && s.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleFrequency;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(drug_id: u32, start: NaiveDate) -> MedicationSchedule {
        MedicationSchedule::new(0, drug_id, "Azithromycin", start, start.and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_add_and_get() {
        let mut store = ScheduleStore::in_memory();
        let s = store.add(3, schedule(1, date(2026, 3, 1))).unwrap();
        assert_eq!(s.id, 1);
        assert_eq!(store.get(1).unwrap().user_id, 3);
    }

    #[test]
    fn test_add_validates() {
        let mut store = ScheduleStore::in_memory();
        let mut s = schedule(1, date(2026, 3, 1));
        s.end_date = date(2026, 2, 1);
        assert!(matches!(store.add(1, s), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_active_and_today() {
        let mut store = ScheduleStore::in_memory();
        let mut morning = schedule(1, date(2026, 3, 1));
        morning.time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let mut weekly = schedule(2, date(2026, 3, 4));
        weekly.frequency = ScheduleFrequency::Weekly;
        let future = schedule(3, date(2026, 5, 1));

        store.add(1, morning).unwrap();
        store.add(1, weekly).unwrap();
        store.add(1, future).unwrap();

        let today = date(2026, 3, 11); // a Wednesday
        assert_eq!(store.active_schedules(1, today).len(), 2);

        let doses = store.todays_schedules(1, today);
        assert_eq!(doses.len(), 2);
        assert_eq!(doses[0].drug_id, 1);

        assert!(store.todays_schedules(1, date(2026, 3, 12)).iter().all(|d| d.drug_id == 1));
        assert!(store.todays_schedules(2, today).is_empty());
    }

    #[test]
    fn test_upcoming() {
        let mut store = ScheduleStore::in_memory();
        store.add(1, schedule(1, date(2026, 3, 1))).unwrap();

        let doses = store.upcoming(1, date(2026, 3, 30), 7);
        // Schedule ends 2026-03-31
        assert_eq!(doses.len(), 2);
    }

    #[test]
    fn test_update_delete_mark_taken() {
        let mut store = ScheduleStore::in_memory();
        let mut s = store.add(1, schedule(1, date(2026, 3, 1))).unwrap();

        s.dosage = 250.0;
        s.dosage_unit = "mg".into();
        store.update(&s).unwrap();
        assert_eq!(store.get(s.id).unwrap().dosage, 250.0);

        let taken = date(2026, 3, 2).and_hms_opt(8, 5, 0).unwrap();
        store.mark_taken(s.id, taken).unwrap();
        assert_eq!(store.get(s.id).unwrap().last_taken, Some(taken));

        assert!(store.has_schedule_for_drug(1, 1));
        assert!(!store.has_schedule_for_drug(2, 1));

        store.delete(s.id).unwrap();
        assert!(matches!(store.delete(s.id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.mark_taken(s.id, taken), Err(StoreError::NotFound(_))));
    }
}
