//! Pure matching logic: reminder due-checks, schedule recurrence and supply estimates.
//!
//! Nothing in this module touches the filesystem or a real clock. Callers pass
//! the current instant explicitly, and [`ReminderPoller`] takes a [`Clock`] so
//! tests can drive time by hand.

mod poller;
mod reminder;
mod schedule;
mod stock;

pub use poller::*;
pub use reminder::*;
pub use schedule::*;
pub use stock::*;

use chrono::{NaiveDateTime, Timelike};

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}
