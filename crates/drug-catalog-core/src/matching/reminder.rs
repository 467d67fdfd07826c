//! Minute-exact reminder matching.

use chrono::{Datelike, Days, NaiveDateTime, Timelike};

use super::truncate_to_minute;
use crate::models::MedicationReminder;

/// A reminder is due when it is active, today's weekday is selected, and its
/// hour and minute equal the current hour and minute.
pub fn is_due(reminder: &MedicationReminder, now: NaiveDateTime) -> bool {
    reminder.is_active
        && reminder.is_scheduled_on(now.weekday())
        && reminder.reminder_time.hour() == now.hour()
        && reminder.reminder_time.minute() == now.minute()
}

/// All reminders due at `now`, in input order.
pub fn due_reminders<'a, I>(reminders: I, now: NaiveDateTime) -> Vec<&'a MedicationReminder>
where
    I: IntoIterator<Item = &'a MedicationReminder>,
{
    reminders.into_iter().filter(|r| is_due(r, now)).collect()
}

/// The first minute at or after `now` (to the minute) at which the reminder is due.
///
/// Returns `None` for inactive reminders and reminders with no weekday selected.
pub fn next_due_instant(reminder: &MedicationReminder, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !reminder.is_active || !reminder.has_any_day() {
        return None;
    }

    let from = truncate_to_minute(now);
    let time = reminder
        .reminder_time
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))?;

    // A selected weekday recurs within 7 days; the 8th covers "today, but earlier".
    (0..=7u64)
        .filter_map(|offset| from.date().checked_add_days(Days::new(offset)))
        .filter(|date| reminder.is_scheduled_on(date.weekday()))
        .map(|date| date.and_time(time))
        .find(|candidate| *candidate >= from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    // 2026-03-02 is a Monday
    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reminder(h: u32, m: u32) -> MedicationReminder {
        MedicationReminder::new(1, 1, "Loratadine", "1 tablet", NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn test_due_on_exact_minute() {
        let r = reminder(8, 30).on_days(&[Weekday::Mon]);

        assert!(is_due(&r, monday(8, 30, 0)));
        assert!(is_due(&r, monday(8, 30, 59)));
        assert!(!is_due(&r, monday(8, 31, 0)));
        assert!(!is_due(&r, monday(8, 29, 59)));
        assert!(!is_due(&r, monday(9, 30, 0)));
    }

    #[test]
    fn test_not_due_on_unselected_day() {
        let r = reminder(8, 30).on_days(&[Weekday::Tue]);
        assert!(!is_due(&r, monday(8, 30, 0)));
    }

    #[test]
    fn test_inactive_never_due() {
        let mut r = reminder(8, 30).every_day();
        r.is_active = false;
        assert!(!is_due(&r, monday(8, 30, 0)));
    }

    #[test]
    fn test_empty_mask_never_due() {
        let r = reminder(8, 30);
        assert!(!is_due(&r, monday(8, 30, 0)));
        assert_eq!(next_due_instant(&r, monday(0, 0, 0)), None);
    }

    #[test]
    fn test_due_reminders_filters() {
        let reminders = vec![
            reminder(8, 30).every_day(),
            reminder(9, 0).every_day(),
            reminder(8, 30).on_days(&[Weekday::Sun]),
        ];
        let due = due_reminders(&reminders, monday(8, 30, 10));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].reminder_time.hour(), 8);
    }

    #[test]
    fn test_next_due_later_today() {
        let r = reminder(20, 0).every_day();
        assert_eq!(next_due_instant(&r, monday(8, 0, 0)), Some(monday(20, 0, 0)));
    }

    #[test]
    fn test_next_due_current_minute() {
        let r = reminder(8, 0).every_day();
        assert_eq!(next_due_instant(&r, monday(8, 0, 45)), Some(monday(8, 0, 0)));
    }

    #[test]
    fn test_next_due_wraps_to_next_week() {
        // Only Mondays at 07:00, asked at 08:00 on a Monday
        let r = reminder(7, 0).on_days(&[Weekday::Mon]);
        let next = next_due_instant(&r, monday(8, 0, 0)).unwrap();
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert!(is_due(&r, next));
    }
}
