// ABOUTME: Waitlist workflow: join, offer a freed slot, respond to an offer, expire stale offers
// ABOUTME: Declined and expired offers cascade the slot to the next matching entry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::matching::{find_matches, FreedSlot};
use crate::booking::is_slot_available;
use crate::database::{Database, NewAppointment, NewWaitlistEntry};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::{
    Appointment, AppointmentStatus, BookingSource, BusinessSettings, Customer, NotificationChannel,
    NotificationKind, OfferStatus, SlotOffer, WaitlistEntry, WaitlistStatus,
};
use crate::notifications::templates::{
    booking_confirmation, waitlist_offer, AppointmentContext, OfferContext,
};
use crate::notifications::{NotificationRequest, NotificationService};
use crate::validation::Validate;
use chrono::{Duration, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

const RESPONSE_TOKEN_LENGTH: usize = 32;

/// Result of answering an offer
#[derive(Debug, Clone, Serialize)]
pub struct OfferResponse {
    /// The offer after the response
    pub offer: SlotOffer,
    /// Appointment booked on acceptance
    pub appointment: Option<Appointment>,
    /// Follow-up offer made to the next entry after a decline
    pub next_offer: Option<SlotOffer>,
}

fn response_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESPONSE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Constant-time comparison so tokens cannot be guessed byte by byte
fn tokens_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

/// Waitlist operations
#[derive(Clone)]
pub struct WaitlistService {
    database: Arc<Database>,
    notifications: NotificationService,
    public_base_url: String,
}

impl WaitlistService {
    /// Create the service; `public_base_url` prefixes offer response links
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        notifications: NotificationService,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            database,
            notifications,
            public_base_url: public_base_url.into(),
        }
    }

    /// Add a standing request
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for bad fields or a pet of another customer and
    /// `RESOURCE_NOT_FOUND` for unknown ids
    pub async fn join(&self, new: &NewWaitlistEntry) -> AppResult<WaitlistEntry> {
        new.validate()?;
        self.database
            .get_customer(new.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;
        let pet = self
            .database
            .get_pet(new.pet_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pet"))?;
        if pet.customer_id != new.customer_id {
            return Err(AppError::invalid_input("Pet does not belong to this customer"));
        }
        let service = self
            .database
            .get_service(new.service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        if !service.is_active {
            return Err(AppError::invalid_input(format!(
                "{} is not currently offered",
                service.name
            )));
        }
        self.database.create_waitlist_entry(new).await
    }

    /// Offer a freed slot to the best matching entry
    ///
    /// Returns `None` when the slot is no longer open or nobody matches.
    /// Entries already offered this exact slot are passed over.
    ///
    /// # Errors
    ///
    /// Returns an error if the database fails
    pub async fn offer_slot(
        &self,
        slot: &FreedSlot,
        now: NaiveDateTime,
    ) -> AppResult<Option<SlotOffer>> {
        let settings = self.database.load_business_settings().await?;
        let Some(service) = self.database.get_service(slot.service_id).await? else {
            return Ok(None);
        };
        let existing = self.database.appointments_on_date(slot.start.date()).await?;
        if !is_slot_available(slot.start, &settings, service.duration_minutes, &existing, now) {
            info!(slot.start = %slot.start, "Freed slot no longer bookable; no waitlist offer");
            return Ok(None);
        }

        let entries = self.database.active_waitlist_for_service(slot.service_id).await?;
        let mut chosen = None;
        for entry in find_matches(&entries, slot, &settings) {
            let previous = self.database.offers_for_entry(entry.id).await?;
            if previous.iter().any(|o| o.slot_start == slot.start) {
                continue;
            }
            if self.database.record_waitlist_offer(entry.id, Utc::now()).await? {
                chosen = Some(entry.clone());
                break;
            }
            info!(waitlist.entry_id = %entry.id, "Entry already claimed; trying next match");
        }
        let Some(entry) = chosen else {
            return Ok(None);
        };

        let deadline = now + Duration::hours(i64::from(settings.offer_deadline_hours));
        let offer = SlotOffer {
            id: Uuid::new_v4(),
            waitlist_entry_id: entry.id,
            slot_start: slot.start,
            duration_minutes: service.duration_minutes,
            service_id: service.id,
            response_token: response_token(),
            expires_at: deadline.min(slot.start),
            status: OfferStatus::Pending,
            appointment_id: None,
            created_at: Utc::now(),
            responded_at: None,
        };
        if let Err(e) = self.database.create_offer(&offer).await {
            let reverted = self
                .database
                .update_waitlist_status(entry.id, WaitlistStatus::Active)
                .await;
            if let Err(release) = reverted {
                warn!(waitlist.entry_id = %entry.id, error = %release, "Entry not released");
            }
            return Err(e);
        }
        AppLogger::log_offer_issued(
            &offer.id.to_string(),
            &entry.id.to_string(),
            &offer.slot_start.to_string(),
            entry.notification_attempts + 1,
        );

        self.notify_offer(&settings, &entry, &offer, &service.name).await;
        Ok(Some(offer))
    }

    async fn notify_offer(
        &self,
        settings: &BusinessSettings,
        entry: &WaitlistEntry,
        offer: &SlotOffer,
        service_name: &str,
    ) {
        let loaded = async {
            let customer = self.database.get_customer(entry.customer_id).await?;
            let pet = self.database.get_pet(entry.pet_id).await?;
            Ok::<_, AppError>(customer.zip(pet))
        }
        .await;
        let (customer, pet) = match loaded {
            Ok(Some(found)) => found,
            Ok(None) => {
                warn!(waitlist.entry_id = %entry.id, "Offer recipient missing");
                return;
            }
            Err(e) => {
                warn!(waitlist.entry_id = %entry.id, error = %e, "Could not load offer recipient");
                return;
            }
        };

        let message = waitlist_offer(&OfferContext {
            business_name: settings.business_name.clone(),
            first_name: customer.first_name.clone(),
            pet_name: pet.name.clone(),
            service_name: service_name.to_owned(),
            slot_start: offer.slot_start,
            duration_minutes: offer.duration_minutes,
            expires_at: offer.expires_at,
            respond_url: format!(
                "{}/waitlist/offers/{}?token={}",
                self.public_base_url, offer.id, offer.response_token
            ),
        });
        let channel = offer_channel(&customer);
        let request = NotificationRequest {
            customer: &customer,
            kind: NotificationKind::WaitlistOffer,
            message,
            channel,
            appointment_id: None,
            campaign_id: None,
        };
        if let Err(e) = self.notifications.send(request).await {
            warn!(offer.id = %offer.id, error = %e, "Waitlist offer notification not logged");
        }
    }

    /// Accept or decline an offer
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` for a wrong token, `OFFER_CLOSED` when the offer
    /// was already answered, `OFFER_EXPIRED` past the deadline and
    /// `SLOT_UNAVAILABLE` when the slot was taken in the meantime
    pub async fn respond(
        &self,
        offer_id: Uuid,
        token: &str,
        accept: bool,
        now: NaiveDateTime,
    ) -> AppResult<OfferResponse> {
        let offer = self
            .database
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Offer"))?;
        if !tokens_match(&offer.response_token, token) {
            return Err(AppError::auth_invalid("Invalid offer response token"));
        }
        if offer.status != OfferStatus::Pending {
            return Err(AppError::new(
                ErrorCode::OfferClosed,
                format!("This offer was already {}", offer.status),
            ));
        }
        if offer.is_expired_at(now) {
            return Err(AppError::new(
                ErrorCode::OfferExpired,
                "The response deadline for this offer has passed",
            ));
        }

        let entry = self
            .database
            .get_waitlist_entry(offer.waitlist_entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waitlist entry"))?;
        let settings = self.database.load_business_settings().await?;

        if accept {
            self.accept(offer, &entry, &settings, now).await
        } else {
            if !self
                .database
                .close_offer(offer.id, OfferStatus::Declined, None, Utc::now())
                .await?
            {
                return Err(offer_closed());
            }
            self.release_entry(&entry, &settings).await?;
            let next_offer = self.cascade(&offer, now).await;
            Ok(OfferResponse {
                offer: self.reload_offer(offer.id).await?,
                appointment: None,
                next_offer,
            })
        }
    }

    async fn accept(
        &self,
        offer: SlotOffer,
        entry: &WaitlistEntry,
        settings: &BusinessSettings,
        now: NaiveDateTime,
    ) -> AppResult<OfferResponse> {
        // The lead time applied when the offer went out
        let rules = BusinessSettings {
            booking_lead_hours: 0,
            ..settings.clone()
        };
        let existing = self.database.appointments_on_date(offer.slot_start.date()).await?;
        if !is_slot_available(offer.slot_start, &rules, offer.duration_minutes, &existing, now) {
            if self
                .database
                .close_offer(offer.id, OfferStatus::Expired, None, Utc::now())
                .await?
            {
                self.release_entry(entry, settings).await?;
            }
            return Err(AppError::slot_unavailable(
                "Sorry, this slot was just booked by someone else",
            ));
        }

        if !self
            .database
            .close_offer(offer.id, OfferStatus::Accepted, None, Utc::now())
            .await?
        {
            return Err(offer_closed());
        }

        let service = self
            .database
            .get_service(offer.service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        let pet = self
            .database
            .get_pet(entry.pet_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pet"))?;
        let customer = self
            .database
            .get_customer(entry.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;

        let appointment = self
            .database
            .create_appointment(&NewAppointment {
                customer_id: entry.customer_id,
                pet_id: entry.pet_id,
                service_id: offer.service_id,
                groomer_id: None,
                addon_ids: Vec::new(),
                scheduled_at: offer.slot_start,
                duration_minutes: offer.duration_minutes,
                total_price_cents: service.price_for(pet.size),
                status: AppointmentStatus::Confirmed,
                source: BookingSource::Waitlist,
                notes: entry.notes.clone(),
            })
            .await?;
        self.database
            .link_offer_appointment(offer.id, appointment.id)
            .await?;
        self.database
            .update_waitlist_status(entry.id, WaitlistStatus::Booked)
            .await?;
        AppLogger::log_booking_created(
            &appointment.id.to_string(),
            BookingSource::Waitlist.as_str(),
            &appointment.scheduled_at.to_string(),
        );

        let ctx = AppointmentContext::new(settings, &customer, &pet, &service.name, &appointment);
        let request = NotificationRequest {
            customer: &customer,
            kind: NotificationKind::BookingConfirmation,
            message: booking_confirmation(&ctx, appointment.status),
            channel: None,
            appointment_id: Some(appointment.id),
            campaign_id: None,
        };
        if let Err(e) = self.notifications.send(request).await {
            warn!(appointment.id = %appointment.id, error = %e, "Waitlist confirmation not logged");
        }

        Ok(OfferResponse {
            offer: self.reload_offer(offer.id).await?,
            appointment: Some(appointment),
            next_offer: None,
        })
    }

    /// Expire every pending offer past its deadline and cascade each slot
    ///
    /// # Errors
    ///
    /// Returns an error if the database fails
    pub async fn expire_offers(&self, now: NaiveDateTime) -> AppResult<usize> {
        let settings = self.database.load_business_settings().await?;
        let mut expired = 0;
        for offer in self.database.overdue_offers(now).await? {
            if !self
                .database
                .close_offer(offer.id, OfferStatus::Expired, None, Utc::now())
                .await?
            {
                continue;
            }
            expired += 1;
            if let Some(entry) = self.database.get_waitlist_entry(offer.waitlist_entry_id).await? {
                self.release_entry(&entry, &settings).await?;
            }
            self.cascade(&offer, now).await;
        }
        Ok(expired)
    }

    /// Withdraw an entry; a pending offer is declined and its slot cascades
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// when the entry is already booked, expired or cancelled
    pub async fn cancel(&self, entry_id: Uuid, now: NaiveDateTime) -> AppResult<WaitlistEntry> {
        let entry = self
            .database
            .get_waitlist_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waitlist entry"))?;
        if !matches!(entry.status, WaitlistStatus::Active | WaitlistStatus::Offered) {
            return Err(AppError::locked(format!(
                "Waitlist entry is already {}",
                entry.status
            )));
        }

        self.database
            .update_waitlist_status(entry.id, WaitlistStatus::Cancelled)
            .await?;
        for offer in self.database.offers_for_entry(entry.id).await? {
            if offer.status == OfferStatus::Pending
                && self
                    .database
                    .close_offer(offer.id, OfferStatus::Declined, None, Utc::now())
                    .await?
            {
                self.cascade(&offer, now).await;
            }
        }

        self.database
            .get_waitlist_entry(entry.id)
            .await?
            .ok_or_else(|| AppError::not_found("Waitlist entry"))
    }

    /// Back to Active, or Expired once every attempt is used
    async fn release_entry(
        &self,
        entry: &WaitlistEntry,
        settings: &BusinessSettings,
    ) -> AppResult<()> {
        let attempts = self
            .database
            .get_waitlist_entry(entry.id)
            .await?
            .map_or(entry.notification_attempts, |e| e.notification_attempts);
        let status = if attempts >= settings.max_offer_attempts {
            WaitlistStatus::Expired
        } else {
            WaitlistStatus::Active
        };
        self.database.update_waitlist_status(entry.id, status).await
    }

    /// Offer a closed offer's slot to the next match; failures are logged
    async fn cascade(&self, offer: &SlotOffer, now: NaiveDateTime) -> Option<SlotOffer> {
        let slot = FreedSlot {
            service_id: offer.service_id,
            start: offer.slot_start,
        };
        match self.offer_slot(&slot, now).await {
            Ok(next) => next,
            Err(e) => {
                warn!(offer.id = %offer.id, error = %e, "Could not cascade waitlist slot");
                None
            }
        }
    }

    async fn reload_offer(&self, id: Uuid) -> AppResult<SlotOffer> {
        self.database
            .get_offer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Offer"))
    }
}

fn offer_closed() -> AppError {
    AppError::new(ErrorCode::OfferClosed, "This offer was already answered")
}

/// Offers go by text when possible, email otherwise
fn offer_channel(customer: &Customer) -> Option<NotificationChannel> {
    if customer.sms_address().is_some() {
        Some(NotificationChannel::Sms)
    } else if customer.email_address().is_some() {
        Some(NotificationChannel::Email)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tokens() {
        let token = response_token();
        assert_eq!(token.len(), RESPONSE_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, response_token());
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc12"));
    }
}
