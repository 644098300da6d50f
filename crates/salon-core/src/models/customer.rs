// ABOUTME: Customer and pet records with contact preferences and size classes
// ABOUTME: Pet size drives pricing; contact preference and opt-ins drive notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::text_enum;
use crate::constants::pet_sizes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a customer wants transactional messages delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactPreference {
    /// Text messages
    #[default]
    Sms,
    /// Email
    Email,
    /// Both channels
    Both,
}

text_enum!(ContactPreference {
    Sms => "sms",
    Email => "email",
    Both => "both",
});

/// A salon customer (pet owner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: Uuid,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address (lower-cased)
    pub email: Option<String>,
    /// Phone number in E.164 form
    pub phone: Option<String>,
    /// Preferred channel for transactional messages
    pub preferred_channel: ContactPreference,
    /// Consent to transactional SMS
    pub sms_opt_in: bool,
    /// Consent to transactional email
    pub email_opt_in: bool,
    /// Consent to marketing campaigns
    pub marketing_opt_in: bool,
    /// Front-desk notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// "First Last"
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Phone number if the customer accepts texts
    #[must_use]
    pub fn sms_address(&self) -> Option<&str> {
        self.phone.as_deref().filter(|_| self.sms_opt_in)
    }

    /// Email address if the customer accepts email
    #[must_use]
    pub fn email_address(&self) -> Option<&str> {
        self.email.as_deref().filter(|_| self.email_opt_in)
    }
}

/// Pet species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSpecies {
    /// Dog
    Dog,
    /// Cat
    Cat,
    /// Rabbits, guinea pigs and the like
    Other,
}

text_enum!(PetSpecies {
    Dog => "dog",
    Cat => "cat",
    Other => "other",
});

/// Size class used for pricing and table assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    /// Up to 20 lbs
    Small,
    /// Up to 50 lbs
    Medium,
    /// Up to 90 lbs
    Large,
    /// Over 90 lbs
    #[serde(rename = "xlarge")]
    XLarge,
}

text_enum!(PetSize {
    Small => "small",
    Medium => "medium",
    Large => "large",
    XLarge => "xlarge",
});

impl PetSize {
    /// Classify a weight in pounds
    #[must_use]
    pub fn from_weight_lbs(weight: f64) -> Self {
        if weight <= pet_sizes::SMALL_MAX_LBS {
            Self::Small
        } else if weight <= pet_sizes::MEDIUM_MAX_LBS {
            Self::Medium
        } else if weight <= pet_sizes::LARGE_MAX_LBS {
            Self::Large
        } else {
            Self::XLarge
        }
    }

    /// Label used in messages ("X-Large")
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::XLarge => "X-Large",
        }
    }
}

/// A customer's pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub customer_id: Uuid,
    /// Pet name
    pub name: String,
    /// Species
    pub species: PetSpecies,
    /// Breed, free text
    pub breed: Option<String>,
    /// Size class
    pub size: PetSize,
    /// Last recorded weight
    pub weight_lbs: Option<f64>,
    /// Birth date when known
    pub birth_date: Option<NaiveDate>,
    /// Handling notes (nervous with dryers, muzzle, ...)
    pub temperament_notes: Option<String>,
    /// Allergies, conditions, medications
    pub medical_notes: Option<String>,
    /// Archived pets are hidden from booking
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_from_weight_boundaries() {
        assert_eq!(PetSize::from_weight_lbs(4.5), PetSize::Small);
        assert_eq!(PetSize::from_weight_lbs(20.0), PetSize::Small);
        assert_eq!(PetSize::from_weight_lbs(20.1), PetSize::Medium);
        assert_eq!(PetSize::from_weight_lbs(50.0), PetSize::Medium);
        assert_eq!(PetSize::from_weight_lbs(90.0), PetSize::Large);
        assert_eq!(PetSize::from_weight_lbs(140.0), PetSize::XLarge);
    }

    #[test]
    fn test_xlarge_wire_name() {
        assert_eq!(
            serde_json::to_string(&PetSize::XLarge).unwrap_or_default(),
            "\"xlarge\""
        );
        assert_eq!(PetSize::parse("xlarge"), Some(PetSize::XLarge));
    }
}
