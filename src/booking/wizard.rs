// ABOUTME: Booking wizard step tables and per-step "can proceed" gates for each booking mode
// ABOUTME: Pure functions over a draft; the same gates guard navigation and final submission
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::constants::limits::{MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_PET_WEIGHT_LBS};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::formatters::is_valid_phone;
use crate::models::{PetSize, PetSpecies};
use crate::validation::{is_valid_email, FieldError, Validate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Modes and steps
// ============================================================================

/// Who is driving the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    /// Public online booking
    Customer,
    /// Staff booking on behalf of a customer
    Admin,
    /// Front-desk walk-in, groomed now
    WalkIn,
}

/// One screen of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    /// Pick a service and add-ons
    Service,
    /// Pick or describe the pet
    Pet,
    /// Pick a slot
    DateTime,
    /// Enter contact details (customer mode)
    Contact,
    /// Find or create the customer (staff modes)
    CustomerLookup,
    /// Confirm and submit
    Review,
}

const CUSTOMER_STEPS: &[BookingStep] = &[
    BookingStep::Service,
    BookingStep::Pet,
    BookingStep::DateTime,
    BookingStep::Contact,
    BookingStep::Review,
];

const ADMIN_STEPS: &[BookingStep] = &[
    BookingStep::CustomerLookup,
    BookingStep::Pet,
    BookingStep::Service,
    BookingStep::DateTime,
    BookingStep::Review,
];

const WALK_IN_STEPS: &[BookingStep] = &[
    BookingStep::CustomerLookup,
    BookingStep::Pet,
    BookingStep::Service,
    BookingStep::Review,
];

// ============================================================================
// Draft
// ============================================================================

/// Contact details for a customer not yet on file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number, any common format
    #[serde(default)]
    pub phone: Option<String>,
}

/// Customer chosen in the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomerSelection {
    /// Customer already on file
    Existing {
        /// Customer id
        customer_id: Uuid,
    },
    /// New customer to create on submit
    New(ContactDetails),
}

/// Pet described for a first visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPetDetails {
    /// Pet name
    #[serde(default)]
    pub name: String,
    /// Species
    pub species: Option<PetSpecies>,
    /// Breed
    pub breed: Option<String>,
    /// Size class
    pub size: Option<PetSize>,
    /// Weight in pounds
    pub weight_lbs: Option<f64>,
    /// Temperament notes for the groomer
    pub temperament_notes: Option<String>,
    /// Medical notes for the groomer
    pub medical_notes: Option<String>,
}

/// Pet chosen in the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PetSelection {
    /// Pet already on file
    Existing {
        /// Pet id
        pet_id: Uuid,
    },
    /// New pet to create on submit
    New(NewPetDetails),
}

/// Everything the wizard has collected so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Wizard mode
    pub mode: BookingMode,
    /// Customer
    #[serde(default)]
    pub customer: Option<CustomerSelection>,
    /// Pet
    #[serde(default)]
    pub pet: Option<PetSelection>,
    /// Service
    #[serde(default)]
    pub service_id: Option<Uuid>,
    /// Add-ons
    #[serde(default)]
    pub addon_ids: Vec<Uuid>,
    /// Salon-local slot start
    #[serde(default)]
    pub slot: Option<NaiveDateTime>,
    /// Notes for the salon
    #[serde(default)]
    pub notes: Option<String>,
    /// Cancellation policy acknowledged (customer mode)
    #[serde(default)]
    pub policy_accepted: bool,
}

impl BookingDraft {
    /// Empty draft for `mode`
    #[must_use]
    pub const fn new(mode: BookingMode) -> Self {
        Self {
            mode,
            customer: None,
            pet: None,
            service_id: None,
            addon_ids: Vec::new(),
            slot: None,
            notes: None,
            policy_accepted: false,
        }
    }
}

// ============================================================================
// Step table lookups
// ============================================================================

/// Ordered steps for a mode
#[must_use]
pub const fn steps(mode: BookingMode) -> &'static [BookingStep] {
    match mode {
        BookingMode::Customer => CUSTOMER_STEPS,
        BookingMode::Admin => ADMIN_STEPS,
        BookingMode::WalkIn => WALK_IN_STEPS,
    }
}

/// Number of steps for a mode
#[must_use]
pub const fn step_count(mode: BookingMode) -> usize {
    steps(mode).len()
}

/// Step at `index`, if the table has one
#[must_use]
pub fn step_at(mode: BookingMode, index: usize) -> Option<BookingStep> {
    steps(mode).get(index).copied()
}

/// Index after `index`, clamped to the last step
#[must_use]
pub fn next_step(mode: BookingMode, index: usize) -> usize {
    index
        .saturating_add(1)
        .min(step_count(mode).saturating_sub(1))
}

/// Index before `index`, clamped to the first step
#[must_use]
pub const fn previous_step(index: usize) -> usize {
    index.saturating_sub(1)
}

// ============================================================================
// Gates
// ============================================================================

fn missing(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_owned(),
        message: message.to_owned(),
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_name(out: &mut Vec<FieldError>, field: &str, value: &str) {
    if blank(value) {
        out.push(missing(field, "is required"));
    } else if value.chars().count() > MAX_NAME_LENGTH {
        out.push(missing(field, "is too long"));
    }
}

fn check_optional_email(out: &mut Vec<FieldError>, field: &str, value: Option<&str>) {
    if let Some(email) = value.filter(|e| !blank(e)) {
        if !is_valid_email(email) {
            out.push(missing(field, "must be a valid email address"));
        }
    }
}

fn check_optional_phone(out: &mut Vec<FieldError>, field: &str, value: Option<&str>) {
    if let Some(phone) = value.filter(|p| !blank(p)) {
        if !is_valid_phone(phone) {
            out.push(missing(field, "must be a valid 10-digit phone number"));
        }
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !blank(v))
}

fn service_gate(draft: &BookingDraft, out: &mut Vec<FieldError>) {
    if draft.service_id.is_none() {
        out.push(missing("service_id", "Choose a service"));
    }
}

fn pet_gate(draft: &BookingDraft, out: &mut Vec<FieldError>) {
    match &draft.pet {
        None => out.push(missing("pet", "Choose or add a pet")),
        Some(PetSelection::Existing { .. }) if draft.mode == BookingMode::Customer => {
            out.push(missing("pet", "Describe your pet"));
        }
        Some(PetSelection::Existing { .. }) => {}
        Some(PetSelection::New(pet)) => {
            check_name(out, "pet.name", &pet.name);
            if pet.species.is_none() {
                out.push(missing("pet.species", "is required"));
            }
            if pet.size.is_none() {
                out.push(missing("pet.size", "is required"));
            }
            if let Some(weight) = pet.weight_lbs {
                if !(weight > 0.0 && weight <= MAX_PET_WEIGHT_LBS) {
                    out.push(missing(
                        "pet.weight_lbs",
                        "must be greater than 0 and at most 250",
                    ));
                }
            }
        }
    }
}

fn datetime_gate(draft: &BookingDraft, out: &mut Vec<FieldError>) {
    if draft.slot.is_none() {
        out.push(missing("slot", "Choose a date and time"));
    }
}

fn contact_gate(draft: &BookingDraft, out: &mut Vec<FieldError>) {
    let Some(CustomerSelection::New(contact)) = &draft.customer else {
        out.push(missing("customer", "Enter your contact details"));
        return;
    };
    check_name(out, "customer.first_name", &contact.first_name);
    check_name(out, "customer.last_name", &contact.last_name);
    if present(contact.email.as_deref()) {
        check_optional_email(out, "customer.email", contact.email.as_deref());
    } else {
        out.push(missing("customer.email", "is required"));
    }
    if present(contact.phone.as_deref()) {
        check_optional_phone(out, "customer.phone", contact.phone.as_deref());
    } else {
        out.push(missing("customer.phone", "is required"));
    }
}

fn lookup_gate(draft: &BookingDraft, out: &mut Vec<FieldError>) {
    let contact = match &draft.customer {
        None => {
            out.push(missing("customer", "Find or add a customer"));
            return;
        }
        Some(CustomerSelection::Existing { .. }) => return,
        Some(CustomerSelection::New(contact)) => contact,
    };
    check_name(out, "customer.first_name", &contact.first_name);
    check_name(out, "customer.last_name", &contact.last_name);
    let has_email = present(contact.email.as_deref());
    let has_phone = present(contact.phone.as_deref());
    match draft.mode {
        BookingMode::WalkIn if !has_phone => {
            out.push(missing("customer.phone", "is required for walk-ins"));
        }
        BookingMode::Admin if !has_email && !has_phone => {
            out.push(missing("customer", "Enter an email address or phone number"));
        }
        _ => {}
    }
    check_optional_email(out, "customer.email", contact.email.as_deref());
    check_optional_phone(out, "customer.phone", contact.phone.as_deref());
}

fn step_gate(draft: &BookingDraft, step: BookingStep, out: &mut Vec<FieldError>) {
    match step {
        BookingStep::Service => service_gate(draft, out),
        BookingStep::Pet => pet_gate(draft, out),
        BookingStep::DateTime => datetime_gate(draft, out),
        BookingStep::Contact => contact_gate(draft, out),
        BookingStep::CustomerLookup => lookup_gate(draft, out),
        BookingStep::Review => {
            for &earlier in steps(draft.mode)
                .iter()
                .filter(|s| **s != BookingStep::Review)
            {
                step_gate(draft, earlier, out);
            }
            if draft.mode == BookingMode::Customer && !draft.policy_accepted {
                out.push(missing(
                    "policy_accepted",
                    "Please accept the cancellation policy",
                ));
            }
            if let Some(notes) = &draft.notes {
                if notes.chars().count() > MAX_NOTES_LENGTH {
                    out.push(missing("notes", "is too long"));
                }
            }
        }
    }
}

/// What still blocks leaving step `index`
///
/// An index past the end of the table reports a single `step` error.
#[must_use]
pub fn missing_requirements(draft: &BookingDraft, index: usize) -> Vec<FieldError> {
    let mut out = Vec::new();
    match step_at(draft.mode, index) {
        Some(step) => step_gate(draft, step, &mut out),
        None => out.push(missing("step", "No such step")),
    }
    out
}

/// Whether the wizard may move past step `index`
#[must_use]
pub fn can_proceed(draft: &BookingDraft, index: usize) -> bool {
    missing_requirements(draft, index).is_empty()
}

/// Highest index the user may open: the first step whose gate fails,
/// or the last step when every earlier gate passes
#[must_use]
pub fn furthest_reachable_step(draft: &BookingDraft) -> usize {
    let last = step_count(draft.mode) - 1;
    (0..last)
        .find(|&index| !can_proceed(draft, index))
        .unwrap_or(last)
}

/// Whether step `index` may be opened directly
#[must_use]
pub fn can_navigate_to(draft: &BookingDraft, index: usize) -> bool {
    index < step_count(draft.mode) && index <= furthest_reachable_step(draft)
}

/// Final gate before the booking is stored
///
/// # Errors
///
/// Returns `BOOKING_INCOMPLETE` listing every unmet requirement
pub fn validate_for_submit(draft: &BookingDraft) -> AppResult<()> {
    let review = step_count(draft.mode) - 1;
    let problems = missing_requirements(draft, review);
    if problems.is_empty() {
        return Ok(());
    }
    let summary = problems
        .iter()
        .map(|p| format!("{} {}", p.field, p.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::new(ErrorCode::BookingIncomplete, summary)
        .with_details(serde_json::json!({ "fields": problems })))
}

impl Validate for BookingDraft {
    fn validate(&self) -> AppResult<()> {
        validate_for_submit(self)
    }
}
