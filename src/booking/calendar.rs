//! Date and slot availability for the playroom.
//!
//! Everything here is a pure function of its inputs: the current local time,
//! the working hours and the set of slots already reserved. No store or
//! transport is involved, so the rules can be exercised directly in tests.

use crate::booking::slot::Slot;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::HashSet;

/// Daily working window. Both bounds are inclusive slot start hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    open_hour: u8,
    close_hour: u8,
}

impl WorkingHours {
    /// Returns `None` unless `open_hour <= close_hour <= 23`.
    pub fn new(open_hour: u8, close_hour: u8) -> Option<Self> {
        (open_hour <= close_hour && close_hour < 24).then_some(Self {
            open_hour,
            close_hour,
        })
    }

    pub fn open_hour(&self) -> u8 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u8 {
        self.close_hour
    }

    /// Every slot of a working day, ascending.
    pub fn all_slots(&self) -> Vec<Slot> {
        (self.open_hour..=self.close_hour).filter_map(Slot::new).collect()
    }

    /// True once no slot of today starts strictly after the current hour.
    pub fn has_closed(&self, now: NaiveDateTime) -> bool {
        now.hour() >= u32::from(self.close_hour)
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open_hour: 10,
            close_hour: 21,
        }
    }
}

/// Returns `horizon_days` consecutive dates, starting today, or tomorrow once
/// today's working window is over.
pub fn offerable_dates(now: NaiveDateTime, horizon_days: u32, hours: &WorkingHours) -> Vec<NaiveDate> {
    let skip_today = usize::from(hours.has_closed(now));
    now.date()
        .iter_days()
        .skip(skip_today)
        .take(horizon_days as usize)
        .collect()
}

/// Returns the slots of `date` that may still be offered, ascending.
///
/// On the current day only hours strictly after the current hour qualify;
/// past dates yield nothing. Slots in `existing` are reserved by someone and
/// are never offered. An empty result means "fully booked", not a failure.
pub fn offerable_slots(
    date: NaiveDate,
    now: NaiveDateTime,
    existing: &HashSet<Slot>,
    hours: &WorkingHours,
) -> Vec<Slot> {
    let today = now.date();
    if date < today {
        return Vec::new();
    }

    let first_hour = if date == today {
        let next_hour = now.hour() + 1;
        u32::from(hours.open_hour).max(next_hour)
    } else {
        u32::from(hours.open_hour)
    };

    (first_hour..=u32::from(hours.close_hour))
        .filter_map(|hour| u8::try_from(hour).ok().and_then(Slot::new))
        .filter(|slot| !existing.contains(slot))
        .collect()
}

/// Working hours plus booking horizon, the configuration the controller
/// consults on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCalendar {
    hours: WorkingHours,
    horizon_days: u32,
}

impl SlotCalendar {
    pub fn new(hours: WorkingHours, horizon_days: u32) -> Self {
        Self { hours, horizon_days }
    }

    pub fn hours(&self) -> &WorkingHours {
        &self.hours
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn dates(&self, now: NaiveDateTime) -> Vec<NaiveDate> {
        offerable_dates(now, self.horizon_days, &self.hours)
    }

    pub fn slots(&self, date: NaiveDate, now: NaiveDateTime, existing: &HashSet<Slot>) -> Vec<Slot> {
        offerable_slots(date, now, existing, &self.hours)
    }

    pub fn is_offerable_date(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        self.dates(now).contains(&date)
    }
}

impl Default for SlotCalendar {
    fn default() -> Self {
        Self::new(WorkingHours::default(), 7)
    }
}
