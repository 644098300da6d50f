// ABOUTME: Booking wizard, pricing, slot availability and the booking submission service
// ABOUTME: Wizard gates and availability are pure; BookingService stores records and notifies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Slot computation
pub mod availability;
/// Price quotes
pub mod pricing;
/// Draft submission
pub mod service;
/// Step tables and gates
pub mod wizard;

pub use availability::{available_slots, is_slot_available, staff_rules, Slot};
pub use pricing::{quote, Quote};
pub use service::{BookedVisit, BookingOutcome, BookingReceipt, BookingService};
pub use wizard::{
    BookingDraft, BookingMode, BookingStep, ContactDetails, CustomerSelection, NewPetDetails,
    PetSelection,
};

use chrono::{Local, NaiveDateTime};

/// Current salon wall-clock time
///
/// The server runs in the salon's timezone, so local time is salon time.
#[must_use]
pub fn salon_now() -> NaiveDateTime {
    Local::now().naive_local()
}
