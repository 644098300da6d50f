// ABOUTME: Waitlist entries and the time-bounded slot offers sent to them
// ABOUTME: Entries count offer attempts; offers carry a response token and deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::text_enum;
use crate::constants::scheduling::MORNING_CUTOFF_HOUR;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Part of the day a waitlisted customer can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimePreference {
    /// Before noon
    Morning,
    /// Noon or later
    Afternoon,
    /// Any time
    #[default]
    Any,
}

text_enum!(TimePreference {
    Morning => "morning",
    Afternoon => "afternoon",
    Any => "any",
});

impl TimePreference {
    /// Whether a slot starting at `time` suits this preference
    #[must_use]
    pub fn accepts(&self, time: NaiveTime) -> bool {
        match self {
            Self::Any => true,
            Self::Morning => time.hour() < MORNING_CUTOFF_HOUR,
            Self::Afternoon => time.hour() >= MORNING_CUTOFF_HOUR,
        }
    }
}

/// Waitlist entry lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Waiting for a matching slot
    Active,
    /// An offer is outstanding
    Offered,
    /// Claimed a slot
    Booked,
    /// Ran out of offer attempts
    Expired,
    /// Withdrawn by the customer or staff
    Cancelled,
}

text_enum!(WaitlistStatus {
    Active => "active",
    Offered => "offered",
    Booked => "booked",
    Expired => "expired",
    Cancelled => "cancelled",
});

/// A customer's standing request for a slot matching given criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Customer
    pub customer_id: Uuid,
    /// Pet to be groomed
    pub pet_id: Uuid,
    /// Wanted service
    pub service_id: Uuid,
    /// Date the customer would ideally come in
    pub requested_date: NaiveDate,
    /// Part of the day that works
    pub time_preference: TimePreference,
    /// Higher goes first (loyal customers, medical grooms)
    pub priority: i32,
    /// Lifecycle status
    pub status: WaitlistStatus,
    /// Offers sent so far
    pub notification_attempts: u32,
    /// When the last offer went out
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Offer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Awaiting an answer
    Pending,
    /// Customer took the slot
    Accepted,
    /// Customer passed
    Declined,
    /// Deadline passed without an answer
    Expired,
}

text_enum!(OfferStatus {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
    Expired => "expired",
});

/// A time-bounded offer of a freed slot to one waitlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotOffer {
    /// Unique identifier
    pub id: Uuid,
    /// Entry the offer was made to
    pub waitlist_entry_id: Uuid,
    /// Salon-local start of the freed slot
    pub slot_start: NaiveDateTime,
    /// Minutes the slot was booked for
    pub duration_minutes: u32,
    /// Service the slot is offered for
    pub service_id: Uuid,
    /// Secret included in the offer link
    #[serde(skip_serializing)]
    pub response_token: String,
    /// Salon-local answer deadline
    pub expires_at: NaiveDateTime,
    /// Lifecycle status
    pub status: OfferStatus,
    /// Appointment created on acceptance
    pub appointment_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// When the customer answered
    pub responded_at: Option<DateTime<Utc>>,
}

impl SlotOffer {
    /// Whether the deadline has passed at salon-local `now`
    #[must_use]
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_preference_cutoff() {
        let eleven_fifty = NaiveTime::from_hms_opt(11, 59, 0).unwrap_or_default();
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        assert!(TimePreference::Morning.accepts(eleven_fifty));
        assert!(!TimePreference::Morning.accepts(noon));
        assert!(TimePreference::Afternoon.accepts(noon));
        assert!(TimePreference::Any.accepts(noon));
    }
}
