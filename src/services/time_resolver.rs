//! Pure time bucketing for the weekly timetable.
//!
//! All times are local wall-clock times in a single implicit zone.

use chrono::{Datelike, Local, NaiveDateTime};
use tracing::warn;

use crate::models::{Day, Period, Schedule, TimeOfDay, TimeSlot};

/// Source of "now" for the current-class query.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Period whose canonical start is exactly `start_time`.
///
/// Unknown starts fall back to the first period with a warning; this never
/// fails.
pub fn period_of(start_time: TimeOfDay) -> Period {
    match Period::ALL.into_iter().find(|p| p.start() == start_time) {
        Some(period) => period,
        None => {
            warn!(
                "start time {} does not match any period, defaulting to {}",
                start_time,
                Period::First.as_db()
            );
            Period::First
        }
    }
}

/// Bucket an arbitrary time of day into a period for current-class lookups.
///
/// Before the second period starts is FIRST, before the third starts is
/// SECOND, anything later is THIRD.
pub fn resolve_current_period(time: TimeOfDay) -> Period {
    if time >= Period::Third.start() {
        Period::Third
    } else if time >= Period::Second.start() {
        Period::Second
    } else {
        Period::First
    }
}

/// End minus start, in minutes. Negative when the slot wraps.
pub fn duration_minutes(slot: &TimeSlot) -> i32 {
    i32::from(slot.end_time.minutes()) - i32::from(slot.start_time.minutes())
}

/// School-day bucket of a timestamp; `None` on Sunday.
pub fn day_of(at: NaiveDateTime) -> Option<Day> {
    Day::from_weekday(at.weekday())
}

/// True when `at` falls on the entry's day and within its slot, both
/// boundaries inclusive.
pub fn is_in_session(schedule: &Schedule, at: NaiveDateTime) -> bool {
    let Some(day) = day_of(at) else {
        return false;
    };
    if day != schedule.day {
        return false;
    }

    let now = TimeOfDay::from(at.time());
    let slot = &schedule.time_slot;
    now >= slot.start_time && now <= slot.end_time
}

/// True when `a` starts strictly after `b` ends.
pub fn starts_after(a: &Schedule, b: &Schedule) -> bool {
    a.time_slot.start_time > b.time_slot.end_time
}
