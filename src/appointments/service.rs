// ABOUTME: Appointment status changes and rescheduling on top of the transition table
// ABOUTME: Notifies the customer and hands freed slots to the waitlist
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::status::validate_transition;
use crate::booking::{is_slot_available, staff_rules};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Appointment, AppointmentStatus, NotificationKind, NotificationLog};
use crate::notifications::templates::{status_update, AppointmentContext};
use crate::notifications::{NotificationRequest, NotificationService};
use crate::waitlist::{FreedSlot, WaitlistService};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a status change
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    /// Appointment after the change
    pub appointment: Appointment,
    /// Status update messages
    pub notifications: Vec<NotificationLog>,
    /// Waitlist offer made for the freed slot
    pub waitlist_offer_id: Option<Uuid>,
}

/// A requested status change
#[derive(Debug, Clone, Copy)]
pub struct StatusChangeRequest<'a> {
    /// New status
    pub to: AppointmentStatus,
    /// Caller acknowledged a destructive change
    pub confirmed: bool,
    /// Cancellation reason
    pub reason: Option<&'a str>,
    /// Staff email for the audit log
    pub actor: Option<&'a str>,
}

/// Appointment lifecycle operations
#[derive(Clone)]
pub struct AppointmentService {
    database: Arc<Database>,
    notifications: NotificationService,
    waitlist: WaitlistService,
}

impl AppointmentService {
    /// Create the service
    #[must_use]
    pub const fn new(
        database: Arc<Database>,
        notifications: NotificationService,
        waitlist: WaitlistService,
    ) -> Self {
        Self {
            database,
            notifications,
            waitlist,
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Appointment> {
        self.database
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))
    }

    /// Move an appointment along the transition table
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND`, `INVALID_STATUS_TRANSITION`,
    /// `CONFIRMATION_REQUIRED`, or `RESOURCE_LOCKED` when a concurrent change
    /// moved the appointment first
    pub async fn change_status(
        &self,
        id: Uuid,
        request: StatusChangeRequest<'_>,
        now: NaiveDateTime,
    ) -> AppResult<StatusChange> {
        let current = self.load(id).await?;
        validate_transition(current.status, request.to, request.confirmed)?;

        let reason = if request.to == AppointmentStatus::Cancelled {
            request.reason.map(str::trim).filter(|r| !r.is_empty())
        } else {
            None
        };
        let appointment = self
            .database
            .update_appointment_status(id, current.status, request.to, reason)
            .await?;
        AppLogger::log_status_change(
            &id.to_string(),
            current.status.as_str(),
            request.to.as_str(),
            request.actor,
        );

        let notifications = self.notify_status(&appointment, reason).await;

        let frees_slot = matches!(
            request.to,
            AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        ) && appointment.scheduled_at > now;
        let waitlist_offer_id = if frees_slot {
            self.release_slot(&appointment, now).await
        } else {
            None
        };

        Ok(StatusChange {
            appointment,
            notifications,
            waitlist_offer_id,
        })
    }

    /// Move a Pending or Confirmed appointment to a new start time
    ///
    /// Staff booking rules apply. The old slot is offered to the waitlist.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` for other statuses and `SLOT_UNAVAILABLE`
    /// when the new time is taken or outside business hours
    pub async fn reschedule(
        &self,
        id: Uuid,
        new_start: NaiveDateTime,
        now: NaiveDateTime,
    ) -> AppResult<Appointment> {
        let current = self.load(id).await?;
        if !matches!(
            current.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        ) {
            return Err(AppError::locked(format!(
                "A {} appointment cannot be rescheduled",
                current.status
            )));
        }
        if new_start == current.scheduled_at {
            return Ok(current);
        }

        let settings = self.database.load_business_settings().await?;
        let others: Vec<Appointment> = self
            .database
            .appointments_on_date(new_start.date())
            .await?
            .into_iter()
            .filter(|a| a.id != id)
            .collect();
        if !is_slot_available(
            new_start,
            &staff_rules(&settings),
            current.duration_minutes,
            &others,
            now,
        ) {
            return Err(AppError::slot_unavailable(format!(
                "{new_start} is not available"
            )));
        }

        let moved = self.database.reschedule_appointment(id, new_start).await?;
        info!(
            appointment.id = %id,
            from = %current.scheduled_at,
            to = %new_start,
            "Appointment rescheduled"
        );
        if current.scheduled_at > now {
            self.release_slot(&current, now).await;
        }
        Ok(moved)
    }

    async fn notify_status(
        &self,
        appointment: &Appointment,
        reason: Option<&str>,
    ) -> Vec<NotificationLog> {
        let loaded = async {
            let settings = self.database.load_business_settings().await?;
            let customer = self.database.get_customer(appointment.customer_id).await?;
            let pet = self.database.get_pet(appointment.pet_id).await?;
            let service = self.database.get_service(appointment.service_id).await?;
            Ok::<_, AppError>((settings, customer, pet, service))
        }
        .await;
        let loaded = match loaded {
            Ok(found) => found,
            Err(e) => {
                warn!(appointment.id = %appointment.id, error = %e, "Could not load status update context");
                return Vec::new();
            }
        };
        let (settings, Some(customer), Some(pet), Some(service)) = loaded else {
            return Vec::new();
        };

        let ctx = AppointmentContext::new(&settings, &customer, &pet, &service.name, appointment);
        let Some(message) = status_update(&ctx, appointment.status, reason) else {
            return Vec::new();
        };
        let request = NotificationRequest {
            customer: &customer,
            kind: NotificationKind::StatusUpdate,
            message,
            channel: None,
            appointment_id: Some(appointment.id),
            campaign_id: None,
        };
        match self.notifications.send(request).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(appointment.id = %appointment.id, error = %e, "Status update not logged");
                Vec::new()
            }
        }
    }

    async fn release_slot(&self, appointment: &Appointment, now: NaiveDateTime) -> Option<Uuid> {
        let slot = FreedSlot {
            service_id: appointment.service_id,
            start: appointment.scheduled_at,
        };
        match self.waitlist.offer_slot(&slot, now).await {
            Ok(offer) => offer.map(|o| o.id),
            Err(e) => {
                warn!(appointment.id = %appointment.id, error = %e, "Waitlist offer failed");
                None
            }
        }
    }
}
