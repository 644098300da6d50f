// ABOUTME: Grooming service catalog with size-based pricing and add-ons
// ABOUTME: Prices are integer cents; durations are minutes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::PetSize;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable grooming service (bath, full groom, nail trim, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroomingService {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: Option<String>,
    /// Table time in minutes
    pub duration_minutes: u32,
    /// Price for small pets, cents
    pub price_small_cents: i64,
    /// Price for medium pets, cents
    pub price_medium_cents: i64,
    /// Price for large pets, cents
    pub price_large_cents: i64,
    /// Price for extra-large pets, cents
    pub price_xlarge_cents: i64,
    /// Inactive services are hidden from booking
    pub is_active: bool,
}

impl GroomingService {
    /// Price for a size class
    #[must_use]
    pub const fn price_for(&self, size: PetSize) -> i64 {
        match size {
            PetSize::Small => self.price_small_cents,
            PetSize::Medium => self.price_medium_cents,
            PetSize::Large => self.price_large_cents,
            PetSize::XLarge => self.price_xlarge_cents,
        }
    }
}

/// Optional extra added to a service (teeth brushing, de-shedding, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Flat price, cents
    pub price_cents: i64,
    /// Extra table time in minutes
    pub duration_minutes: u32,
    /// Inactive add-ons are hidden from booking
    pub is_active: bool,
}
