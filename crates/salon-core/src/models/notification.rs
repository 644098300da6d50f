// ABOUTME: Notification log records for SMS and email deliveries
// ABOUTME: Each row tracks channel, message kind, delivery status and attempt count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Text message via Twilio
    Sms,
    /// Email via Resend
    Email,
}

text_enum!(NotificationChannel {
    Sms => "sms",
    Email => "email",
});

/// What the message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Booking received / confirmed
    BookingConfirmation,
    /// Day-before reminder
    AppointmentReminder,
    /// Status changed (confirmed, cancelled, ready for pickup)
    StatusUpdate,
    /// Waitlist slot offer
    WaitlistOffer,
    /// Post-appointment report card
    ReportCard,
    /// Marketing campaign
    Campaign,
}

text_enum!(NotificationKind {
    BookingConfirmation => "booking_confirmation",
    AppointmentReminder => "appointment_reminder",
    StatusUpdate => "status_update",
    WaitlistOffer => "waitlist_offer",
    ReportCard => "report_card",
    Campaign => "campaign",
});

impl NotificationKind {
    /// Marketing messages need marketing consent on top of channel consent
    #[must_use]
    pub const fn is_marketing(&self) -> bool {
        matches!(self, Self::Campaign)
    }
}

/// Delivery outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Logged, not yet handed to the provider
    Pending,
    /// Accepted by the provider
    Sent,
    /// Provider rejected or was unreachable
    Failed,
    /// Not sent (no consent or no address)
    Skipped,
}

text_enum!(DeliveryStatus {
    Pending => "pending",
    Sent => "sent",
    Failed => "failed",
    Skipped => "skipped",
});

/// One outbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    /// Unique identifier
    pub id: Uuid,
    /// Recipient customer, when known
    pub customer_id: Option<Uuid>,
    /// Related appointment
    pub appointment_id: Option<Uuid>,
    /// Related campaign
    pub campaign_id: Option<Uuid>,
    /// Channel
    pub channel: NotificationChannel,
    /// Message kind
    pub kind: NotificationKind,
    /// Phone number or email address
    pub recipient: String,
    /// Email subject
    pub subject: Option<String>,
    /// Rendered body
    pub body: String,
    /// Delivery outcome
    pub status: DeliveryStatus,
    /// Twilio SID / Resend id
    pub provider_message_id: Option<String>,
    /// Last provider error
    pub error_message: Option<String>,
    /// Delivery attempts so far
    pub attempts: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// When the provider accepted the message
    pub sent_at: Option<DateTime<Utc>>,
}
