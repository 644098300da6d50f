// ABOUTME: Post-visit report cards written by groomers and delivered to the customer
// ABOUTME: Only completed appointments get a card, and only one each
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::database::{Database, NewReportCard};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AppointmentStatus, DeliveryStatus, NotificationKind, NotificationLog, ReportCard,
};
use crate::notifications::templates::report_card;
use crate::notifications::{NotificationRequest, NotificationService};
use crate::validation::Validate;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A delivered report card
#[derive(Debug, Clone, Serialize)]
pub struct ReportCardDelivery {
    /// The card, with `sent_at` stamped when a message went out
    pub report_card: ReportCard,
    /// Messages written for it
    pub notifications: Vec<NotificationLog>,
}

/// Report card operations
#[derive(Clone)]
pub struct ReportCardService {
    database: Arc<Database>,
    notifications: NotificationService,
}

impl ReportCardService {
    /// Create the service
    #[must_use]
    pub const fn new(database: Arc<Database>, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Write the card for a completed appointment
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for bad fields or an appointment that is not
    /// completed, and `RESOURCE_ALREADY_EXISTS` when it already has a card
    pub async fn create(&self, new: &NewReportCard) -> AppResult<ReportCard> {
        new.validate()?;
        let appointment = self
            .database
            .get_appointment(new.appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;
        if appointment.status != AppointmentStatus::Completed {
            return Err(AppError::invalid_input(format!(
                "Report cards are written after the visit; this appointment is {}",
                appointment.status
            )));
        }
        if self
            .database
            .report_card_for_appointment(appointment.id)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists("Report card for this appointment"));
        }
        self.database.create_report_card(new).await
    }

    /// Deliver a card to the pet's owner
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown card or missing records
    pub async fn send(&self, id: Uuid) -> AppResult<ReportCardDelivery> {
        let card = self
            .database
            .get_report_card(id)
            .await?
            .ok_or_else(|| AppError::not_found("Report card"))?;
        let appointment = self
            .database
            .get_appointment(card.appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;
        let customer = self
            .database
            .get_customer(appointment.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;
        let pet = self
            .database
            .get_pet(appointment.pet_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pet"))?;
        let settings = self.database.load_business_settings().await?;

        let request = NotificationRequest {
            customer: &customer,
            kind: NotificationKind::ReportCard,
            message: report_card(&settings.business_name, &customer.first_name, &pet.name, &card),
            channel: None,
            appointment_id: Some(appointment.id),
            campaign_id: None,
        };
        let notifications = self.notifications.send(request).await?;

        if notifications.iter().any(|n| n.status == DeliveryStatus::Sent) {
            self.database.mark_report_card_sent(card.id, Utc::now()).await?;
            info!(report_card.id = %card.id, "Report card delivered");
        }
        let report_card = self
            .database
            .get_report_card(card.id)
            .await?
            .ok_or_else(|| AppError::not_found("Report card"))?;
        Ok(ReportCardDelivery {
            report_card,
            notifications,
        })
    }
}
