// ABOUTME: Turns a completed booking draft into stored customer, pet and appointment records
// ABOUTME: Prices the booking, re-checks availability and sends the booking confirmation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::availability::{is_slot_available, staff_rules};
use super::pricing::{quote, Quote};
use super::wizard::{
    validate_for_submit, BookingDraft, BookingMode, ContactDetails, CustomerSelection,
    PetSelection,
};
use crate::database::{CustomerInput, Database, NewAppointment, PetInput};
use crate::errors::{AppError, AppResult};
use crate::formatters::normalize_phone;
use crate::logging::AppLogger;
use crate::models::{
    Appointment, AppointmentStatus, BookingSource, ContactPreference, Customer,
    NotificationKind, NotificationLog, Pet, PetSize,
};
use crate::notifications::templates::{booking_confirmation, AppointmentContext};
use crate::notifications::{NotificationRequest, NotificationService};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Stored booking
#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    /// New appointment
    pub appointment: Appointment,
    /// Customer (found or created)
    pub customer: Customer,
    /// Pet (found or created)
    pub pet: Pet,
    /// Price breakdown
    pub quote: Quote,
    /// Confirmation messages
    pub notifications: Vec<NotificationLog>,
}

/// What an anonymous online booker gets back
///
/// Stored customer and pet records never leave the server on the public
/// booking route.
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    /// Reference to quote when calling the salon
    pub reference: Uuid,
    /// The booked visit
    pub appointment: BookedVisit,
    /// Price breakdown
    pub quote: Quote,
}

/// Appointment fields safe to echo to the booker
#[derive(Debug, Clone, Serialize)]
pub struct BookedVisit {
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
}

impl From<BookingOutcome> for BookingReceipt {
    fn from(outcome: BookingOutcome) -> Self {
        let appointment = outcome.appointment;
        Self {
            reference: appointment.id,
            appointment: BookedVisit {
                scheduled_at: appointment.scheduled_at,
                duration_minutes: appointment.duration_minutes,
                total_price_cents: appointment.total_price_cents,
                status: appointment.status,
                source: appointment.source,
            },
            quote: outcome.quote,
        }
    }
}

/// Booking submission
#[derive(Clone)]
pub struct BookingService {
    database: Arc<Database>,
    notifications: NotificationService,
}

impl BookingService {
    /// Create the service
    #[must_use]
    pub const fn new(database: Arc<Database>, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Store a completed draft
    ///
    /// Online bookings start Pending, staff bookings Confirmed, and walk-ins
    /// are CheckedIn at `now` without a confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `BOOKING_INCOMPLETE` for an unfinished draft, `SLOT_UNAVAILABLE`
    /// when the slot filled up, `RESOURCE_NOT_FOUND` for unknown ids and
    /// `INVALID_INPUT` for inactive catalog items or a pet of another customer
    pub async fn submit(
        &self,
        draft: &BookingDraft,
        groomer_id: Option<Uuid>,
        now: NaiveDateTime,
    ) -> AppResult<BookingOutcome> {
        validate_for_submit(draft)?;

        let (source, status) = match draft.mode {
            BookingMode::Customer => (BookingSource::Online, AppointmentStatus::Pending),
            BookingMode::Admin => (BookingSource::Admin, AppointmentStatus::Confirmed),
            BookingMode::WalkIn => (BookingSource::WalkIn, AppointmentStatus::CheckedIn),
        };

        let service_id = draft
            .service_id
            .ok_or_else(|| AppError::invalid_input("service_id is required"))?;
        let service = self
            .database
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        let addons = self.database.get_addons(&draft.addon_ids).await?;

        let pet_size = self.requested_pet_size(draft).await?;
        let priced = quote(&service, pet_size, &draft.addon_ids, &addons)?;

        let scheduled_at = if draft.mode == BookingMode::WalkIn {
            now
        } else {
            let start = draft
                .slot
                .ok_or_else(|| AppError::invalid_input("slot is required"))?;
            self.ensure_available(draft.mode, start, priced.duration_minutes, now)
                .await?;
            start
        };

        let customer = self.resolve_customer(draft).await?;
        let pet = self.resolve_pet(draft, &customer).await?;

        let appointment = self
            .database
            .create_appointment(&NewAppointment {
                customer_id: customer.id,
                pet_id: pet.id,
                service_id: service.id,
                groomer_id,
                addon_ids: draft.addon_ids.clone(),
                scheduled_at,
                duration_minutes: priced.duration_minutes,
                total_price_cents: priced.total_cents,
                status,
                source,
                notes: draft.notes.clone(),
            })
            .await?;

        AppLogger::log_booking_created(
            &appointment.id.to_string(),
            source.as_str(),
            &appointment.scheduled_at.to_string(),
        );

        let notifications = if draft.mode == BookingMode::WalkIn {
            Vec::new()
        } else {
            self.confirm(&customer, &pet, &service.name, &appointment)
                .await
        };

        Ok(BookingOutcome {
            appointment,
            customer,
            pet,
            quote: priced,
            notifications,
        })
    }

    async fn ensure_available(
        &self,
        mode: BookingMode,
        start: NaiveDateTime,
        duration_minutes: u32,
        now: NaiveDateTime,
    ) -> AppResult<()> {
        let mut rules = self.database.load_business_settings().await?;
        if mode == BookingMode::Admin {
            rules = staff_rules(&rules);
        }
        let existing = self.database.appointments_on_date(start.date()).await?;
        if is_slot_available(start, &rules, duration_minutes, &existing, now) {
            Ok(())
        } else {
            Err(AppError::slot_unavailable(format!(
                "{start} is no longer available"
            )))
        }
    }

    async fn requested_pet_size(&self, draft: &BookingDraft) -> AppResult<PetSize> {
        match &draft.pet {
            Some(PetSelection::Existing { pet_id }) => Ok(self
                .database
                .get_pet(*pet_id)
                .await?
                .ok_or_else(|| AppError::not_found("Pet"))?
                .size),
            Some(PetSelection::New(details)) => Ok(details
                .size
                .or_else(|| details.weight_lbs.map(PetSize::from_weight_lbs))
                .unwrap_or(PetSize::Medium)),
            None => Err(AppError::invalid_input("pet is required")),
        }
    }

    async fn resolve_customer(&self, draft: &BookingDraft) -> AppResult<Customer> {
        match &draft.customer {
            Some(CustomerSelection::Existing { customer_id }) => self
                .database
                .get_customer(*customer_id)
                .await?
                .ok_or_else(|| AppError::not_found("Customer")),
            Some(CustomerSelection::New(contact)) => {
                self.find_or_create_customer(contact, draft.mode).await
            }
            None => Err(AppError::invalid_input("customer is required")),
        }
    }

    /// Staff bookings match returning customers by email, then by phone.
    ///
    /// Online bookings are unauthenticated, so they attach to an existing
    /// record only when email and phone both match it. Otherwise the booker
    /// gets a record of their own built from the details they typed.
    async fn find_or_create_customer(
        &self,
        contact: &ContactDetails,
        mode: BookingMode,
    ) -> AppResult<Customer> {
        let email = contact
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let phone = contact.phone.as_deref().and_then(normalize_phone);

        let by_email = match email {
            Some(email) => self.database.find_customer_by_email(email).await?,
            None => None,
        };

        if mode != BookingMode::Customer {
            if let Some(found) = by_email {
                return Ok(found);
            }
            if let Some(phone) = &phone {
                if let Some(found) = self.database.find_customer_by_phone(phone).await? {
                    return Ok(found);
                }
            }
            return self.create_customer(contact, email, phone, None).await;
        }

        match (by_email, email) {
            (Some(found), _) if phone.is_some() && found.phone == phone => Ok(found),
            (Some(found), Some(email)) => {
                // Email is unique per record; staff reconcile from the note
                warn!(
                    customer.id = %found.id,
                    "Online booking email matches a record with a different phone"
                );
                let note = format!(
                    "Online booking gave email {email}, which is on another customer record"
                );
                self.create_customer(contact, None, phone, Some(note)).await
            }
            _ => self.create_customer(contact, email, phone, None).await,
        }
    }

    async fn create_customer(
        &self,
        contact: &ContactDetails,
        email: Option<&str>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> AppResult<Customer> {
        let preferred_channel = if phone.is_some() {
            ContactPreference::Sms
        } else {
            ContactPreference::Email
        };
        self.database
            .create_customer(&CustomerInput {
                first_name: contact.first_name.trim().to_owned(),
                last_name: contact.last_name.trim().to_owned(),
                email: email.map(str::to_owned),
                phone,
                preferred_channel,
                sms_opt_in: true,
                email_opt_in: true,
                marketing_opt_in: false,
                notes,
            })
            .await
    }

    /// New pets reuse an active pet of the same name and species
    async fn resolve_pet(&self, draft: &BookingDraft, customer: &Customer) -> AppResult<Pet> {
        match &draft.pet {
            Some(PetSelection::Existing { pet_id }) => {
                let pet = self
                    .database
                    .get_pet(*pet_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Pet"))?;
                if pet.customer_id != customer.id {
                    return Err(AppError::invalid_input(
                        "Pet does not belong to this customer",
                    ));
                }
                if !pet.is_active {
                    return Err(AppError::invalid_input(format!(
                        "{} is no longer an active pet",
                        pet.name
                    )));
                }
                Ok(pet)
            }
            Some(PetSelection::New(details)) => {
                let species = details
                    .species
                    .ok_or_else(|| AppError::invalid_input("pet.species is required"))?;
                let existing = self.database.list_pets_for_customer(customer.id).await?;
                if let Some(pet) = existing.into_iter().find(|p| {
                    p.is_active
                        && p.species == species
                        && p.name.eq_ignore_ascii_case(details.name.trim())
                }) {
                    return Ok(pet);
                }
                self.database
                    .create_pet(
                        customer.id,
                        &PetInput {
                            name: details.name.trim().to_owned(),
                            species,
                            breed: details.breed.clone(),
                            size: details.size,
                            weight_lbs: details.weight_lbs,
                            birth_date: None,
                            temperament_notes: details.temperament_notes.clone(),
                            medical_notes: details.medical_notes.clone(),
                        },
                    )
                    .await
            }
            None => Err(AppError::invalid_input("pet is required")),
        }
    }

    /// Confirmation failures are logged; the booking stands
    async fn confirm(
        &self,
        customer: &Customer,
        pet: &Pet,
        service_name: &str,
        appointment: &Appointment,
    ) -> Vec<NotificationLog> {
        let settings = match self.database.load_business_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Could not load settings for booking confirmation");
                return Vec::new();
            }
        };
        let ctx = AppointmentContext::new(&settings, customer, pet, service_name, appointment);
        let request = NotificationRequest {
            customer,
            kind: NotificationKind::BookingConfirmation,
            message: booking_confirmation(&ctx, appointment.status),
            channel: None,
            appointment_id: Some(appointment.id),
            campaign_id: None,
        };
        match self.notifications.send(request).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(appointment.id = %appointment.id, error = %e, "Booking confirmation not logged");
                Vec::new()
            }
        }
    }
}
