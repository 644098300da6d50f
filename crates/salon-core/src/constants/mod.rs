// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Business defaults, validation limits and service names for the salon back-office
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Constants module
//!
//! Values here are the defaults used when the salon has not saved its own
//! business settings, plus the hard limits enforced at the API boundary.

/// Service identity used in logs
pub mod service_names {
    /// Server binary / tracing target name
    pub const SALON_SERVER: &str = "salon-server";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8090;
}

/// Scheduling defaults
pub mod scheduling {
    /// Minutes between consecutive bookable start times
    pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;
    /// Minutes kept free after each appointment for cleanup
    pub const DEFAULT_BUFFER_MINUTES: u32 = 15;
    /// Appointments that may overlap (grooming tables / groomers on shift)
    pub const DEFAULT_CAPACITY: u32 = 2;
    /// Online bookings must start at least this many hours from now
    pub const DEFAULT_BOOKING_LEAD_HOURS: u32 = 2;
    /// Online bookings may be made at most this many days ahead
    pub const DEFAULT_BOOKING_WINDOW_DAYS: u32 = 60;
    /// Reminder goes out this many hours before the appointment
    pub const DEFAULT_REMINDER_HOURS: u32 = 24;
    /// Default opening time (24h clock)
    pub const DEFAULT_OPEN_HOUR: u32 = 8;
    /// Default closing time (24h clock)
    pub const DEFAULT_CLOSE_HOUR: u32 = 18;
    /// Slots starting before this hour count as "morning"
    pub const MORNING_CUTOFF_HOUR: u32 = 12;
}

/// Waitlist defaults
pub mod waitlist {
    /// Entries match freed slots within this many days of the requested date
    pub const DEFAULT_MATCH_WINDOW_DAYS: u32 = 3;
    /// Hours a customer has to accept a slot offer
    pub const DEFAULT_OFFER_DEADLINE_HOURS: u32 = 2;
    /// Offers sent to one entry before it expires
    pub const DEFAULT_MAX_OFFER_ATTEMPTS: u32 = 3;
}

/// Notification limits
pub mod notifications {
    /// Delivery attempts per notification log row
    pub const MAX_DELIVERY_ATTEMPTS: u32 = 3;
    /// Twilio single-segment limit; longer bodies are split by the carrier
    pub const SMS_SEGMENT_LENGTH: usize = 160;
    /// Default Twilio API base
    pub const TWILIO_API_BASE: &str = "https://api.twilio.com";
    /// Default Resend API base
    pub const RESEND_API_BASE: &str = "https://api.resend.com";
}

/// Input validation limits
pub mod limits {
    /// Person and pet names
    pub const MAX_NAME_LENGTH: usize = 80;
    /// Free-text notes
    pub const MAX_NOTES_LENGTH: usize = 2000;
    /// Campaign body
    pub const MAX_CAMPAIGN_BODY_LENGTH: usize = 5000;
    /// Email subject line
    pub const MAX_SUBJECT_LENGTH: usize = 200;
    /// Report card photos
    pub const MAX_REPORT_CARD_PHOTOS: usize = 10;
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    /// Maximum page size for list endpoints
    pub const MAX_PAGE_SIZE: u32 = 200;
    /// Heaviest pet accepted, in pounds
    pub const MAX_PET_WEIGHT_LBS: f64 = 250.0;
}

/// Pet size thresholds (inclusive upper bounds, pounds)
pub mod pet_sizes {
    /// Small: up to 20 lbs
    pub const SMALL_MAX_LBS: f64 = 20.0;
    /// Medium: up to 50 lbs
    pub const MEDIUM_MAX_LBS: f64 = 50.0;
    /// Large: up to 90 lbs, anything heavier is extra large
    pub const LARGE_MAX_LBS: f64 = 90.0;
}

/// Authentication defaults
pub mod auth {
    /// JWT lifetime
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 12;
    /// Audience claim for staff tokens
    pub const JWT_AUDIENCE: &str = "salon-back-office";
    /// Cookie name accepted as an alternative to the Authorization header
    pub const AUTH_COOKIE_NAME: &str = "auth_token";
}
