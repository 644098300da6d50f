// ABOUTME: Marketing campaign records and audience segment definitions
// ABOUTME: Segments are stored as tagged JSON so new filters do not need schema changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::{text_enum, NotificationChannel, PetSize, PetSpecies};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campaign lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Being written
    Draft,
    /// Waiting for its send time
    Scheduled,
    /// Dispatch in progress
    Sending,
    /// Dispatched
    Sent,
    /// Withdrawn before sending
    Cancelled,
}

text_enum!(CampaignStatus {
    Draft => "draft",
    Scheduled => "scheduled",
    Sending => "sending",
    Sent => "sent",
    Cancelled => "cancelled",
});

impl CampaignStatus {
    /// Content and audience may still change
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Scheduled)
    }
}

/// Who receives a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudienceSegment {
    /// Every opted-in customer
    All,
    /// Customers whose last completed visit is at least `days` ago
    Lapsed {
        /// Days since last visit
        days: u32,
    },
    /// Owners of at least one pet of this species
    Species {
        /// Species filter
        species: PetSpecies,
    },
    /// Owners of at least one pet of this size
    PetSize {
        /// Size filter
        size: PetSize,
    },
    /// Customers created within the last `days`
    NewCustomers {
        /// Days since sign-up
        days: u32,
    },
}

/// A marketing campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier
    pub id: Uuid,
    /// Internal name
    pub name: String,
    /// Delivery channel
    pub channel: NotificationChannel,
    /// Email subject (email campaigns)
    pub subject: Option<String>,
    /// Body template with `{{placeholder}}` variables
    pub body: String,
    /// Audience
    pub segment: AudienceSegment,
    /// Lifecycle status
    pub status: CampaignStatus,
    /// Salon-local send time for scheduled campaigns
    pub scheduled_for: Option<NaiveDateTime>,
    /// Messages accepted by the provider
    pub sent_count: u32,
    /// Messages that failed
    pub failed_count: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
