//! Clock-driven reminder polling.

use std::cell::Cell;

use chrono::{Duration, Local, NaiveDateTime};

use super::{is_due, next_due_instant, truncate_to_minute};
use crate::models::MedicationReminder;

/// Source of the current local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Fires each due reminder once per minute, however often it is polled.
///
/// The guard remembers the last evaluated minute as a full timestamp. If
/// polls were missed (the host slept, the timer stalled), the next poll also
/// evaluates the skipped minutes, up to `max_catch_up` of them. A clock moved
/// backward restarts the guard at the new time.
#[derive(Debug)]
pub struct ReminderPoller<C: Clock = SystemClock> {
    clock: C,
    last_checked: Option<NaiveDateTime>,
    max_catch_up: u32,
}

impl ReminderPoller<SystemClock> {
    pub fn system(max_catch_up: u32) -> Self {
        Self::new(SystemClock, max_catch_up)
    }
}

impl<C: Clock> ReminderPoller<C> {
    pub fn new(clock: C, max_catch_up: u32) -> Self {
        Self {
            clock,
            last_checked: None,
            max_catch_up,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The last minute that was evaluated.
    pub fn last_checked(&self) -> Option<NaiveDateTime> {
        self.last_checked
    }

    /// Forget the guard, e.g. after the reminder list was replaced.
    pub fn reset(&mut self) {
        self.last_checked = None;
    }

    /// Reminders that became due since the previous poll.
    ///
    /// Returns nothing when called again within an already evaluated minute.
    pub fn poll<'a>(&mut self, reminders: &'a [MedicationReminder]) -> Vec<&'a MedicationReminder> {
        let now = truncate_to_minute(self.clock.now());
        let window = self.window_ending_at(now);
        self.last_checked = Some(now);

        if window.is_empty() {
            return Vec::new();
        }

        let due: Vec<&MedicationReminder> = reminders
            .iter()
            .filter(|r| window.iter().any(|minute| is_due(r, *minute)))
            .collect();

        if !due.is_empty() {
            tracing::debug!(count = due.len(), minute = %now, "Reminders due");
        }
        due
    }

    /// Earliest upcoming due instant across `reminders`, skipping the minute
    /// already evaluated.
    pub fn next_due_instant(&self, reminders: &[MedicationReminder]) -> Option<NaiveDateTime> {
        let mut from = truncate_to_minute(self.clock.now());
        if self.last_checked.is_some_and(|last| last >= from) {
            from += Duration::minutes(1);
        }
        reminders
            .iter()
            .filter_map(|r| next_due_instant(r, from))
            .min()
    }

    fn window_ending_at(&self, now: NaiveDateTime) -> Vec<NaiveDateTime> {
        let Some(last) = self.last_checked else {
            return vec![now];
        };

        if now == last {
            return Vec::new();
        }
        if now < last {
            tracing::warn!(previous = %last, now = %now, "Clock moved backward, restarting reminder guard");
            return vec![now];
        }

        let gap = (now - last).num_minutes();
        let span = gap.min(i64::from(self.max_catch_up) + 1);
        if gap > span {
            tracing::warn!(skipped = gap - span, "Reminder polling fell behind, dropping oldest minutes");
        }

        (0..span)
            .rev()
            .map(|back| now - Duration::minutes(back))
            .collect()
    }
}
