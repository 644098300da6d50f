// ABOUTME: Bookable slot computation from business hours, lead time, booking window and capacity
// ABOUTME: Pure functions; callers pass the day's appointments and the salon-local "now"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::models::{Appointment, BusinessSettings};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

const STAFF_BOOKING_WINDOW_DAYS: u32 = 365;

/// A bookable start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Salon-local start
    pub start: NaiveDateTime,
    /// Salon-local end (without buffer)
    pub end: NaiveDateTime,
    /// How many more bookings fit in this window
    pub remaining_capacity: u32,
}

fn minutes(m: u32) -> Duration {
    Duration::minutes(i64::from(m))
}

/// Appointments holding a chair during `[start, start + duration + buffer)`
fn occupied(
    existing: &[Appointment],
    start: NaiveDateTime,
    duration_minutes: u32,
    buffer_minutes: u32,
) -> u32 {
    let end = start + minutes(duration_minutes + buffer_minutes);
    existing
        .iter()
        .filter(|a| a.status.occupies_slot() && a.overlaps(start, end, buffer_minutes))
        .count() as u32
}

fn within_rules(
    start: NaiveDateTime,
    settings: &BusinessSettings,
    duration_minutes: u32,
    now: NaiveDateTime,
) -> bool {
    let date = start.date();
    let Some(hours) = settings.hours.for_weekday(date.weekday()) else {
        return false;
    };
    let last_day = now.date() + Duration::days(i64::from(settings.booking_window_days));
    let earliest = now + Duration::hours(i64::from(settings.booking_lead_hours));

    start.time() >= hours.open
        && start + minutes(duration_minutes) <= date.and_time(hours.close)
        && start >= earliest
        && date <= last_day
}

/// Open slots on `date` for an appointment of `duration_minutes`
///
/// Slots start at opening time and step by the slot interval. Closed days,
/// days outside the booking window and slots inside the lead time yield nothing.
#[must_use]
pub fn available_slots(
    date: NaiveDate,
    settings: &BusinessSettings,
    duration_minutes: u32,
    existing: &[Appointment],
    now: NaiveDateTime,
) -> Vec<Slot> {
    let Some(hours) = settings.hours.for_weekday(date.weekday()) else {
        return Vec::new();
    };
    if duration_minutes == 0 || settings.slot_interval_minutes == 0 {
        return Vec::new();
    }

    let close = date.and_time(hours.close);
    let step = minutes(settings.slot_interval_minutes);
    let mut start = date.and_time(hours.open);
    let mut slots = Vec::new();

    while start + minutes(duration_minutes) <= close {
        if within_rules(start, settings, duration_minutes, now) {
            let taken = occupied(existing, start, duration_minutes, settings.buffer_minutes);
            if taken < settings.capacity {
                slots.push(Slot {
                    start,
                    end: start + minutes(duration_minutes),
                    remaining_capacity: settings.capacity - taken,
                });
            }
        }
        start += step;
    }
    slots
}

/// Whether a single start time can take another appointment
///
/// Unlike [`available_slots`] the start need not sit on the slot grid, so a
/// freed appointment time can be re-offered as is.
#[must_use]
pub fn is_slot_available(
    start: NaiveDateTime,
    settings: &BusinessSettings,
    duration_minutes: u32,
    existing: &[Appointment],
    now: NaiveDateTime,
) -> bool {
    duration_minutes > 0
        && within_rules(start, settings, duration_minutes, now)
        && occupied(existing, start, duration_minutes, settings.buffer_minutes) < settings.capacity
}

/// Rules for bookings made by staff: no lead time and a year ahead
#[must_use]
pub fn staff_rules(settings: &BusinessSettings) -> BusinessSettings {
    BusinessSettings {
        booking_lead_hours: 0,
        booking_window_days: STAFF_BOOKING_WINDOW_DAYS,
        ..settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, BookingSource};
    use chrono::Utc;
    use uuid::Uuid;

    // 2025-03-04 is a Tuesday
    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default()
    }

    fn appointment(start: NaiveDateTime, minutes: u32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            groomer_id: None,
            addon_ids: Vec::new(),
            scheduled_at: start,
            duration_minutes: minutes,
            total_price_cents: 6500,
            status,
            source: BookingSource::Online,
            notes: None,
            cancellation_reason: None,
            reminder_sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn settings() -> BusinessSettings {
        BusinessSettings {
            capacity: 1,
            ..BusinessSettings::default()
        }
    }

    #[test]
    fn test_open_day_grid() {
        let slots = available_slots(
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap_or_default(),
            &settings(),
            60,
            &[],
            at(1, 9, 0),
        );
        // 8:00 through 17:00 on a 30 minute grid
        assert_eq!(slots.len(), 19);
        assert_eq!(slots.first().map(|s| s.start), Some(at(4, 8, 0)));
        assert_eq!(slots.last().map(|s| s.start), Some(at(4, 17, 0)));
    }

    #[test]
    fn test_lead_time_hides_early_slots() {
        let slots = available_slots(
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap_or_default(),
            &settings(),
            60,
            &[],
            at(4, 9, 10),
        );
        assert_eq!(slots.first().map(|s| s.start), Some(at(4, 11, 30)));
    }

    #[test]
    fn test_capacity_and_buffer_block_overlaps() {
        let booked = [appointment(at(4, 10, 0), 60, AppointmentStatus::Confirmed)];
        let s = settings();
        let now = at(1, 9, 0);
        assert!(!is_slot_available(at(4, 10, 30), &s, 60, &booked, now));
        // ends 11:00, buffer runs to 11:15
        assert!(!is_slot_available(at(4, 11, 0), &s, 60, &booked, now));
        assert!(is_slot_available(at(4, 11, 30), &s, 60, &booked, now));
        // the incoming appointment's buffer also counts
        assert!(!is_slot_available(at(4, 8, 50), &s, 60, &booked, now));
    }

    #[test]
    fn test_cancelled_appointments_free_the_chair() {
        let booked = [appointment(at(4, 10, 0), 60, AppointmentStatus::Cancelled)];
        assert!(is_slot_available(at(4, 10, 0), &settings(), 60, &booked, at(1, 9, 0)));
    }

    #[test]
    fn test_window_and_closing_time() {
        let s = settings();
        assert!(!is_slot_available(at(4, 17, 30), &s, 60, &[], at(1, 9, 0)));
        let far = NaiveDate::from_ymd_opt(2025, 6, 3)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap_or_default();
        assert!(!is_slot_available(far, &s, 60, &[], at(1, 9, 0)));
    }
}
