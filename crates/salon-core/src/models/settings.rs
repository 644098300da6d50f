// ABOUTME: Staff-editable business settings: opening hours, capacity and policy knobs
// ABOUTME: Stored as JSON in system settings, falling back to the documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::constants::{scheduling, waitlist};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Opening hours for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    /// Opening time
    pub open: NaiveTime,
    /// Closing time (last appointment must end by then)
    pub close: NaiveTime,
}

impl DayHours {
    /// Build from whole hours; `None` when out of range
    #[must_use]
    pub fn from_hours(open: u32, close: u32) -> Option<Self> {
        Some(Self {
            open: NaiveTime::from_hms_opt(open, 0, 0)?,
            close: NaiveTime::from_hms_opt(close, 0, 0)?,
        })
    }
}

/// Weekly opening hours; `None` means closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    /// Monday
    pub monday: Option<DayHours>,
    /// Tuesday
    pub tuesday: Option<DayHours>,
    /// Wednesday
    pub wednesday: Option<DayHours>,
    /// Thursday
    pub thursday: Option<DayHours>,
    /// Friday
    pub friday: Option<DayHours>,
    /// Saturday
    pub saturday: Option<DayHours>,
    /// Sunday
    pub sunday: Option<DayHours>,
}

impl WeeklyHours {
    /// Hours for a weekday
    #[must_use]
    pub const fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    /// Every day paired with its weekday, Monday first
    #[must_use]
    pub fn days(&self) -> [(Weekday, Option<&DayHours>); 7] {
        [
            (Weekday::Mon, self.monday.as_ref()),
            (Weekday::Tue, self.tuesday.as_ref()),
            (Weekday::Wed, self.wednesday.as_ref()),
            (Weekday::Thu, self.thursday.as_ref()),
            (Weekday::Fri, self.friday.as_ref()),
            (Weekday::Sat, self.saturday.as_ref()),
            (Weekday::Sun, self.sunday.as_ref()),
        ]
    }
}

impl Default for WeeklyHours {
    fn default() -> Self {
        let regular =
            DayHours::from_hours(scheduling::DEFAULT_OPEN_HOUR, scheduling::DEFAULT_CLOSE_HOUR);
        Self {
            monday: regular,
            tuesday: regular,
            wednesday: regular,
            thursday: regular,
            friday: regular,
            saturday: DayHours::from_hours(9, 16),
            sunday: None,
        }
    }
}

/// Runtime business configuration edited from the settings screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    /// Name used in messages
    pub business_name: String,
    /// Salon phone number shown in messages
    pub phone: Option<String>,
    /// Reply-to email
    pub email: Option<String>,
    /// IANA timezone label shown to customers
    pub timezone: String,
    /// Opening hours
    pub hours: WeeklyHours,
    /// Minutes between bookable start times
    pub slot_interval_minutes: u32,
    /// Cleanup minutes after each appointment
    pub buffer_minutes: u32,
    /// Appointments that may overlap
    pub capacity: u32,
    /// Minimum hours between now and an online booking
    pub booking_lead_hours: u32,
    /// Maximum days ahead for online bookings
    pub booking_window_days: u32,
    /// Hours before the appointment the reminder is sent
    pub reminder_hours_before: u32,
    /// ± days a waitlist entry matches around its requested date
    pub waitlist_window_days: u32,
    /// Hours a waitlist offer stays open
    pub offer_deadline_hours: u32,
    /// Offers per waitlist entry before it expires
    pub max_offer_attempts: u32,
    /// Cancellation policy text the customer must accept
    pub cancellation_policy: String,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            business_name: "Pampered Paws Grooming".to_owned(),
            phone: None,
            email: None,
            timezone: "America/Los_Angeles".to_owned(),
            hours: WeeklyHours::default(),
            slot_interval_minutes: scheduling::DEFAULT_SLOT_INTERVAL_MINUTES,
            buffer_minutes: scheduling::DEFAULT_BUFFER_MINUTES,
            capacity: scheduling::DEFAULT_CAPACITY,
            booking_lead_hours: scheduling::DEFAULT_BOOKING_LEAD_HOURS,
            booking_window_days: scheduling::DEFAULT_BOOKING_WINDOW_DAYS,
            reminder_hours_before: scheduling::DEFAULT_REMINDER_HOURS,
            waitlist_window_days: waitlist::DEFAULT_MATCH_WINDOW_DAYS,
            offer_deadline_hours: waitlist::DEFAULT_OFFER_DEADLINE_HOURS,
            max_offer_attempts: waitlist::DEFAULT_MAX_OFFER_ATTEMPTS,
            cancellation_policy:
                "Please give us 24 hours notice to cancel or reschedule. Late cancellations and no-shows may be charged 50% of the service price."
                    .to_owned(),
        }
    }
}
