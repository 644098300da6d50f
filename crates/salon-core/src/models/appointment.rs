// ABOUTME: Appointment record, lifecycle status and booking source
// ABOUTME: Times are salon-local; overlap checks include the cleanup buffer supplied by callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::text_enum;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Requested online, awaiting salon confirmation
    Pending,
    /// Confirmed by the salon
    Confirmed,
    /// Pet dropped off
    CheckedIn,
    /// On the table
    InProgress,
    /// Finished and picked up
    Completed,
    /// Cancelled by customer or salon
    Cancelled,
    /// Customer never arrived
    NoShow,
}

text_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

impl AppointmentStatus {
    /// Every status, in lifecycle order
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::CheckedIn,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// No further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Whether an appointment in this status holds its time slot
    #[must_use]
    pub const fn occupies_slot(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow)
    }

    /// Human label ("Checked In")
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::CheckedIn => "Checked In",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No-Show",
        }
    }
}

/// Where the booking came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    /// Customer booking wizard
    Online,
    /// Staff booked on the customer's behalf
    Admin,
    /// Customer walked in without a booking
    WalkIn,
    /// Claimed from a waitlist offer
    Waitlist,
}

text_enum!(BookingSource {
    Online => "online",
    Admin => "admin",
    WalkIn => "walk_in",
    Waitlist => "waitlist",
});

/// A scheduled grooming appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: Uuid,
    /// Customer
    pub customer_id: Uuid,
    /// Pet being groomed
    pub pet_id: Uuid,
    /// Booked service
    pub service_id: Uuid,
    /// Assigned groomer, when known
    pub groomer_id: Option<Uuid>,
    /// Selected add-ons
    pub addon_ids: Vec<Uuid>,
    /// Salon-local start time
    pub scheduled_at: NaiveDateTime,
    /// Service plus add-on minutes
    pub duration_minutes: u32,
    /// Quoted total, cents
    pub total_price_cents: i64,
    /// Lifecycle status
    pub status: AppointmentStatus,
    /// Booking channel
    pub source: BookingSource,
    /// Customer or staff notes
    pub notes: Option<String>,
    /// Reason recorded on cancellation / no-show
    pub cancellation_reason: Option<String>,
    /// When the reminder went out
    pub reminder_sent_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Salon-local end time (without buffer)
    #[must_use]
    pub fn ends_at(&self) -> NaiveDateTime {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whether this appointment, padded by `buffer_minutes`, overlaps `[start, end)`
    #[must_use]
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime, buffer_minutes: u32) -> bool {
        let own_end = self.ends_at() + Duration::minutes(i64::from(buffer_minutes));
        self.scheduled_at < end && start < own_end
    }
}
