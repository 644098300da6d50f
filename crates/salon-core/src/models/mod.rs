// ABOUTME: Core data models for the salon back-office
// ABOUTME: Re-exports customers, pets, catalog, appointments, waitlist, notifications and campaigns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Data Models
//!
//! Plain records mirrored from the salon database. Enumerations stored as text
//! expose `as_str` / `parse` so the database layer and the JSON API agree on
//! one spelling.
//!
//! Appointment times are salon-local wall-clock times (`NaiveDateTime`): the
//! salon has a single location and every screen shows local time.

/// Implements `as_str`, `parse` and `Display` for a text-backed enum
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Database / wire representation
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse the database / wire representation
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;

mod appointment;
mod campaign;
mod catalog;
mod customer;
mod notification;
mod report_card;
mod settings;
mod user;
mod waitlist;

pub use appointment::{Appointment, AppointmentStatus, BookingSource};
pub use campaign::{AudienceSegment, Campaign, CampaignStatus};
pub use catalog::{Addon, GroomingService};
pub use customer::{ContactPreference, Customer, Pet, PetSize, PetSpecies};
pub use notification::{DeliveryStatus, NotificationChannel, NotificationKind, NotificationLog};
pub use report_card::ReportCard;
pub use settings::{BusinessSettings, DayHours, WeeklyHours};
pub use user::{StaffUser, UserRole};
pub use waitlist::{OfferStatus, SlotOffer, TimePreference, WaitlistEntry, WaitlistStatus};
