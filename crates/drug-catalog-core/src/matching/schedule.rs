//! Schedule recurrence and dose projection.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::truncate_to_minute;
use crate::models::{MedicationSchedule, ScheduleFrequency};

/// Upper bound on the days scanned by [`next_dose`].
const MAX_SEARCH_DAYS: u64 = 400;

/// Does the schedule call for a dose on `date`?
///
/// Monthly schedules match on the start date's day-of-month only, so a start
/// on the 31st never matches a shorter month.
pub fn applies_on(schedule: &MedicationSchedule, date: NaiveDate) -> bool {
    if !schedule.covers(date) {
        return false;
    }

    match schedule.frequency {
        ScheduleFrequency::Daily => true,
        ScheduleFrequency::Weekly => date.weekday() == schedule.start_date.weekday(),
        ScheduleFrequency::Monthly => date.day() == schedule.start_date.day(),
        ScheduleFrequency::SpecificDays => schedule
            .weekday_numbers()
            .contains(&date.weekday().number_from_monday()),
        ScheduleFrequency::Once => date == schedule.start_date,
    }
}

/// One projected dose of a schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledDose {
    pub schedule_id: u32,
    pub user_id: u32,
    pub drug_id: u32,
    pub drug_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub dosage: f64,
    pub dosage_unit: String,
}

impl ScheduledDose {
    pub fn from_schedule(schedule: &MedicationSchedule, date: NaiveDate) -> Self {
        Self {
            schedule_id: schedule.id,
            user_id: schedule.user_id,
            drug_id: schedule.drug_id,
            drug_name: schedule.drug_name.clone(),
            date,
            time: schedule.time,
            dosage: schedule.dosage,
            dosage_unit: schedule.dosage_unit.clone(),
        }
    }

    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Doses of active schedules falling on `date`, ordered by time of day.
pub fn doses_on<'a, I>(schedules: I, date: NaiveDate) -> Vec<ScheduledDose>
where
    I: IntoIterator<Item = &'a MedicationSchedule>,
{
    let mut doses: Vec<ScheduledDose> = schedules
        .into_iter()
        .filter(|s| s.is_active && applies_on(s, date))
        .map(|s| ScheduledDose::from_schedule(s, date))
        .collect();
    doses.sort_by_key(|d| d.time);
    doses
}

/// Doses of active schedules over `[from, from + days]`, ordered by (date, time).
pub fn project<'a, I>(schedules: I, from: NaiveDate, days: u32) -> Vec<ScheduledDose>
where
    I: IntoIterator<Item = &'a MedicationSchedule>,
{
    let active: Vec<&MedicationSchedule> = schedules.into_iter().filter(|s| s.is_active).collect();

    let mut doses: Vec<ScheduledDose> = (0..=u64::from(days))
        .map_while(|offset| from.checked_add_days(Days::new(offset)))
        .flat_map(|date| {
            active
                .iter()
                .filter(move |s| applies_on(s, date))
                .map(move |s| ScheduledDose::from_schedule(s, date))
        })
        .collect();
    doses.sort_by_key(|d| (d.date, d.time));
    doses
}

/// The next dose instant at or after `now` (to the minute), if the schedule has one left.
pub fn next_dose(schedule: &MedicationSchedule, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !schedule.is_active {
        return None;
    }

    let from = truncate_to_minute(now);
    let first_day = from.date().max(schedule.start_date);

    (0..MAX_SEARCH_DAYS)
        .map_while(|offset| first_day.checked_add_days(Days::new(offset)))
        .take_while(|date| *date <= schedule.end_date)
        .filter(|date| applies_on(schedule, *date))
        .map(|date| truncate_to_minute(date.and_time(schedule.time)))
        .find(|candidate| *candidate >= from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(frequency: ScheduleFrequency, start: NaiveDate, end: NaiveDate) -> MedicationSchedule {
        let mut s = MedicationSchedule::new(1, 1, "Omeprazole", start, start.and_hms_opt(0, 0, 0).unwrap());
        s.id = 1;
        s.end_date = end;
        s.frequency = frequency;
        s
    }

    #[test]
    fn test_outside_range_never_applies() {
        let s = schedule(ScheduleFrequency::Daily, date(2026, 3, 2), date(2026, 3, 8));
        assert!(!applies_on(&s, date(2026, 3, 1)));
        assert!(applies_on(&s, date(2026, 3, 2)));
        assert!(applies_on(&s, date(2026, 3, 8)));
        assert!(!applies_on(&s, date(2026, 3, 9)));
    }

    #[test]
    fn test_weekly_matches_start_weekday() {
        // 2026-03-04 is a Wednesday
        let s = schedule(ScheduleFrequency::Weekly, date(2026, 3, 4), date(2026, 4, 30));
        assert!(applies_on(&s, date(2026, 3, 11)));
        assert!(applies_on(&s, date(2026, 3, 18)));
        assert!(!applies_on(&s, date(2026, 3, 12)));
    }

    #[test]
    fn test_monthly_matches_day_of_month() {
        let s = schedule(ScheduleFrequency::Monthly, date(2026, 1, 15), date(2026, 12, 31));
        assert!(applies_on(&s, date(2026, 2, 15)));
        assert!(applies_on(&s, date(2026, 7, 15)));
        assert!(!applies_on(&s, date(2026, 7, 16)));
    }

    #[test]
    fn test_monthly_on_31st_skips_short_months() {
        let s = schedule(ScheduleFrequency::Monthly, date(2026, 1, 31), date(2026, 12, 31));
        assert!(!applies_on(&s, date(2026, 2, 28)));
        assert!(!applies_on(&s, date(2026, 4, 30)));
        assert!(applies_on(&s, date(2026, 3, 31)));
    }

    #[test]
    fn test_specific_days() {
        let mut s = schedule(ScheduleFrequency::SpecificDays, date(2026, 3, 1), date(2026, 3, 31));
        s.set_weekdays(&[Weekday::Mon, Weekday::Fri]);

        assert!(applies_on(&s, date(2026, 3, 2))); // Monday
        assert!(applies_on(&s, date(2026, 3, 6))); // Friday
        assert!(!applies_on(&s, date(2026, 3, 3)));
        assert!(!applies_on(&s, date(2026, 3, 8))); // Sunday
    }

    #[test]
    fn test_sunday_is_seven() {
        let mut s = schedule(ScheduleFrequency::SpecificDays, date(2026, 3, 1), date(2026, 3, 31));
        s.days_of_week = "7".into();
        assert!(applies_on(&s, date(2026, 3, 8)));
        assert!(!applies_on(&s, date(2026, 3, 9)));
    }

    #[test]
    fn test_once() {
        let s = schedule(ScheduleFrequency::Once, date(2026, 3, 2), date(2026, 3, 31));
        assert!(applies_on(&s, date(2026, 3, 2)));
        assert!(!applies_on(&s, date(2026, 3, 3)));
    }

    #[test]
    fn test_project_orders_by_date_then_time() {
        let mut evening = schedule(ScheduleFrequency::Daily, date(2026, 3, 1), date(2026, 3, 31));
        evening.id = 1;
        evening.time = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        let mut morning = schedule(ScheduleFrequency::Daily, date(2026, 3, 1), date(2026, 3, 31));
        morning.id = 2;
        morning.time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let doses = project(&[evening, morning], date(2026, 3, 2), 2);

        // 3 days inclusive, 2 doses each
        assert_eq!(doses.len(), 6);
        assert_eq!(doses[0].schedule_id, 2);
        assert_eq!(doses[1].schedule_id, 1);
        assert_eq!(doses[0].date, date(2026, 3, 2));
        assert_eq!(doses[5].date, date(2026, 3, 4));
        assert!(doses.windows(2).all(|w| w[0].at() <= w[1].at()));
    }

    #[test]
    fn test_project_skips_inactive() {
        let mut s = schedule(ScheduleFrequency::Daily, date(2026, 3, 1), date(2026, 3, 31));
        s.is_active = false;
        assert!(project(&[s], date(2026, 3, 2), 7).is_empty());
    }

    #[test]
    fn test_project_includes_future_start() {
        let s = schedule(ScheduleFrequency::Once, date(2026, 3, 5), date(2026, 3, 5));
        let doses = project(&[s], date(2026, 3, 2), 7);
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].date, date(2026, 3, 5));
    }

    #[test]
    fn test_doses_on_sorted_by_time() {
        let mut a = schedule(ScheduleFrequency::Daily, date(2026, 3, 1), date(2026, 3, 31));
        a.time = NaiveTime::from_hms_opt(21, 0, 0).unwrap();
        let mut b = a.clone();
        b.time = NaiveTime::from_hms_opt(7, 30, 0).unwrap();

        let doses = doses_on(&[a, b], date(2026, 3, 10));
        assert_eq!(doses[0].time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_next_dose() {
        let s = schedule(ScheduleFrequency::Weekly, date(2026, 3, 4), date(2026, 3, 31));
        let now = date(2026, 3, 5).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_dose(&s, now), Some(date(2026, 3, 11).and_hms_opt(8, 0, 0).unwrap()));

        let after_end = date(2026, 4, 1).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(next_dose(&s, after_end), None);
    }

    #[test]
    fn test_next_dose_before_start() {
        let s = schedule(ScheduleFrequency::Daily, date(2026, 3, 10), date(2026, 3, 31));
        let now = date(2026, 3, 1).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_dose(&s, now), Some(date(2026, 3, 10).and_hms_opt(8, 0, 0).unwrap()));
    }
}
