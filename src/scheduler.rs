// ABOUTME: Periodic background jobs: appointment reminders, offer expiry and scheduled campaigns
// ABOUTME: Each job is callable on demand and runs together on a tokio interval when enabled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::booking::salon_now;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Appointment, BusinessSettings, DeliveryStatus, NotificationKind};
use crate::notifications::templates::{appointment_reminder, AppointmentContext};
use crate::notifications::NotificationRequest;
use crate::resources::ServerResources;
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Counts from one pass over every job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobsSummary {
    /// Reminders sent
    pub reminders: usize,
    /// Offers expired
    pub expired_offers: usize,
    /// Campaigns dispatched
    pub campaigns: usize,
}

/// Remind customers whose appointment starts within the reminder window
///
/// Only reminders a provider accepted are counted. A failed delivery leaves
/// the appointment unstamped so the next run tries again; a customer with no
/// usable channel is stamped without counting, since retrying cannot help.
///
/// # Errors
///
/// Returns an error if the due list cannot be loaded
pub async fn send_due_reminders(
    resources: &ServerResources,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let started = Instant::now();
    let database = &resources.database;
    let settings = database.load_business_settings().await?;
    let until = now + Duration::hours(i64::from(settings.reminder_hours_before));

    let mut sent = 0;
    for appointment in database.appointments_due_for_reminder(now, until).await? {
        match remind(resources, &settings, &appointment).await {
            Ok(true) => sent += 1,
            Ok(false) => {}
            Err(e) => warn!(appointment.id = %appointment.id, error = %e, "Reminder not sent"),
        }
    }
    AppLogger::log_job_run("reminders", sent, elapsed_ms(started));
    Ok(sent)
}

async fn remind(
    resources: &ServerResources,
    settings: &BusinessSettings,
    appointment: &Appointment,
) -> AppResult<bool> {
    let database = &resources.database;
    let (Some(customer), Some(pet), Some(service)) = (
        database.get_customer(appointment.customer_id).await?,
        database.get_pet(appointment.pet_id).await?,
        database.get_service(appointment.service_id).await?,
    ) else {
        return Err(AppError::not_found("Appointment records"));
    };

    let ctx = AppointmentContext::new(settings, &customer, &pet, &service.name, appointment);
    let logs = resources
        .notifications
        .send(NotificationRequest {
            customer: &customer,
            kind: NotificationKind::AppointmentReminder,
            message: appointment_reminder(&ctx),
            channel: None,
            appointment_id: Some(appointment.id),
            campaign_id: None,
        })
        .await?;

    if logs.iter().any(|log| log.status == DeliveryStatus::Sent) {
        database.mark_reminder_sent(appointment.id, Utc::now()).await?;
        return Ok(true);
    }
    if logs.iter().any(|log| log.status == DeliveryStatus::Failed) {
        warn!(appointment.id = %appointment.id, "Reminder delivery failed; retrying next run");
        return Ok(false);
    }
    info!(appointment.id = %appointment.id, "No reminder channel for customer");
    database.mark_reminder_sent(appointment.id, Utc::now()).await?;
    Ok(false)
}

/// Expire overdue waitlist offers and cascade their slots
///
/// # Errors
///
/// Returns an error if the overdue list cannot be loaded
pub async fn expire_offers(resources: &ServerResources, now: NaiveDateTime) -> AppResult<usize> {
    let started = Instant::now();
    let expired = resources.waitlist.expire_offers(now).await?;
    AppLogger::log_job_run("expire_offers", expired, elapsed_ms(started));
    Ok(expired)
}

/// Send scheduled campaigns whose time has come
///
/// # Errors
///
/// Returns an error if the due list cannot be loaded
pub async fn dispatch_campaigns(
    resources: &ServerResources,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let started = Instant::now();
    let dispatched = resources.campaigns.dispatch_due(now).await?;
    AppLogger::log_job_run("campaigns", dispatched, elapsed_ms(started));
    Ok(dispatched)
}

/// Run every job once; a failing job does not stop the others
pub async fn run_all(resources: &ServerResources, now: NaiveDateTime) -> JobsSummary {
    let mut summary = JobsSummary::default();
    match send_due_reminders(resources, now).await {
        Ok(n) => summary.reminders = n,
        Err(e) => warn!(error = %e, "Reminder job failed"),
    }
    match expire_offers(resources, now).await {
        Ok(n) => summary.expired_offers = n,
        Err(e) => warn!(error = %e, "Offer expiry job failed"),
    }
    match dispatch_campaigns(resources, now).await {
        Ok(n) => summary.campaigns = n,
        Err(e) => warn!(error = %e, "Campaign job failed"),
    }
    summary
}

/// Run [`run_all`] every `interval` until the runtime shuts down
#[must_use]
pub fn spawn_background_jobs(
    resources: Arc<ServerResources>,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Background jobs started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let summary = run_all(&resources, salon_now()).await;
            if summary != JobsSummary::default() {
                info!(
                    reminders = summary.reminders,
                    expired_offers = summary.expired_offers,
                    campaigns = summary.campaigns,
                    "Background jobs ran"
                );
            }
        }
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
