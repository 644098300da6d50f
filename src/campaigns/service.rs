// ABOUTME: Campaign lifecycle: draft, schedule, cancel and dispatch to a consenting audience
// ABOUTME: Dispatch is claimed atomically so a campaign is never sent twice
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::segments::{marketing_address, SegmentMatch};
use crate::database::{CampaignUpdate, CustomerSummary, Database, NewCampaign};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Campaign, CampaignStatus, Customer, DeliveryStatus, NotificationKind};
use crate::notifications::templates::campaign_message;
use crate::notifications::{NotificationRequest, NotificationService};
use crate::validation::{validate_campaign, Validate};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Who a campaign would reach right now
#[derive(Debug, Clone, Serialize)]
pub struct AudiencePreview {
    /// Customers in the segment
    pub matched: usize,
    /// Of those, customers reachable with marketing consent
    pub reachable: usize,
    /// Reachable customers
    pub recipients: Vec<Customer>,
}

/// Counters from one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Accepted by the provider
    pub sent: u32,
    /// Rejected or unreachable provider
    pub failed: u32,
    /// In the segment but without consent or address
    pub skipped: u32,
}

/// Campaign operations
#[derive(Clone)]
pub struct CampaignService {
    database: Arc<Database>,
    notifications: NotificationService,
    public_base_url: String,
}

impl CampaignService {
    /// Create the service; `public_base_url` feeds the `booking_url` placeholder
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

    async fn load(&self, id: Uuid) -> AppResult<Campaign> {
        self.database
            .get_campaign(id)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign"))
    }

    /// Store a Draft
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for missing fields or unknown placeholders
    pub async fn create(&self, new: &NewCampaign) -> AppResult<Campaign> {
        new.validate()?;
        self.database.create_campaign(new).await
    }

    /// Change content or audience of a Draft or Scheduled campaign
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` once sending started and `INVALID_INPUT` when
    /// the merged campaign is not sendable
    pub async fn update(&self, id: Uuid, update: &CampaignUpdate) -> AppResult<Campaign> {
        update.validate()?;
        let mut campaign = self.load(id).await?;
        if !campaign.status.is_editable() {
            return Err(AppError::locked(format!(
                "A {} campaign can no longer be edited",
                campaign.status
            )));
        }

        if let Some(name) = &update.name {
            campaign.name = name.trim().to_owned();
        }
        if let Some(channel) = update.channel {
            campaign.channel = channel;
        }
        if let Some(subject) = &update.subject {
            campaign.subject = Some(subject.clone()).filter(|s| !s.trim().is_empty());
        }
        if let Some(body) = &update.body {
            campaign.body = body.clone();
        }
        if let Some(segment) = &update.segment {
            campaign.segment = segment.clone();
        }
        validate_campaign(campaign.channel, campaign.subject.as_deref(), &campaign.body)?;

        self.database.save_campaign_content(&campaign).await?;
        self.load(id).await
    }

    /// Queue for sending at salon-local `at`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a time in the past and `RESOURCE_LOCKED`
    /// once sending started
    pub async fn schedule(
        &self,
        id: Uuid,
        at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> AppResult<Campaign> {
        let campaign = self.load(id).await?;
        if !campaign.status.is_editable() {
            return Err(AppError::locked(format!(
                "A {} campaign cannot be scheduled",
                campaign.status
            )));
        }
        if at <= now {
            return Err(AppError::invalid_input("Send time must be in the future"));
        }
        self.database
            .set_campaign_status(id, CampaignStatus::Scheduled, Some(at))
            .await?;
        self.load(id).await
    }

    /// Withdraw a Draft or Scheduled campaign
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` once sending started
    pub async fn cancel(&self, id: Uuid) -> AppResult<Campaign> {
        let campaign = self.load(id).await?;
        if !campaign.status.is_editable() {
            return Err(AppError::locked(format!(
                "A {} campaign cannot be cancelled",
                campaign.status
            )));
        }
        self.database
            .set_campaign_status(id, CampaignStatus::Cancelled, None)
            .await?;
        self.load(id).await
    }

    /// Segment members and the reachable subset
    ///
    /// # Errors
    ///
    /// Returns an error if the database fails
    pub async fn preview_audience(
        &self,
        id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<AudiencePreview> {
        let campaign = self.load(id).await?;
        let summaries = self.database.customer_summaries().await?;
        Ok(audience(&campaign, summaries, now))
    }

    /// Dispatch a Draft or Scheduled campaign now
    ///
    /// When the audience cannot be loaded the campaign goes back to its
    /// previous status so it can be sent again. Per-recipient errors count
    /// as failed and the dispatch carries on.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` when the campaign is already sending, sent or
    /// cancelled
    pub async fn send(&self, id: Uuid, now: NaiveDateTime) -> AppResult<DispatchReport> {
        let campaign = self.load(id).await?;
        if !self.database.claim_campaign_for_sending(id).await? {
            return Err(AppError::locked(format!(
                "A {} campaign cannot be sent",
                campaign.status
            )));
        }

        let prepared = async {
            let summaries = self.database.customer_summaries().await?;
            let settings = self.database.load_business_settings().await?;
            Ok::<_, AppError>((summaries, settings))
        }
        .await;
        let (summaries, settings) = match prepared {
            Ok(found) => found,
            Err(e) => {
                warn!(campaign.id = %id, error = %e, "Campaign audience not loaded, releasing");
                if let Err(release) = self
                    .database
                    .release_campaign_claim(id, campaign.status)
                    .await
                {
                    warn!(campaign.id = %id, error = %release, "Campaign claim not released");
                }
                return Err(e);
            }
        };

        let preview = audience(&campaign, summaries, now);
        let mut report = DispatchReport {
            skipped: u32::try_from(preview.matched - preview.reachable).unwrap_or(u32::MAX),
            ..DispatchReport::default()
        };

        for customer in &preview.recipients {
            let pets = match self.database.list_pets_for_customer(customer.id).await {
                Ok(pets) => pets,
                Err(e) => {
                    warn!(campaign.id = %id, customer.id = %customer.id, error = %e, "Recipient pets not loaded");
                    report.failed += 1;
                    continue;
                }
            };
            let pet_name = pets
                .into_iter()
                .find(|p| p.is_active)
                .map_or_else(|| "your pet".to_owned(), |p| p.name);
            let vars = HashMap::from([
                ("first_name", customer.first_name.clone()),
                ("last_name", customer.last_name.clone()),
                ("pet_name", pet_name),
                ("business_name", settings.business_name.clone()),
                ("booking_url", format!("{}/book", self.public_base_url)),
            ]);
            let request = NotificationRequest {
                customer,
                kind: NotificationKind::Campaign,
                message: campaign_message(&campaign, &vars),
                channel: Some(campaign.channel),
                appointment_id: None,
                campaign_id: Some(campaign.id),
            };
            match self.notifications.send(request).await {
                Ok(logs) => {
                    for log in logs {
                        match log.status {
                            DeliveryStatus::Sent => report.sent += 1,
                            DeliveryStatus::Failed => report.failed += 1,
                            DeliveryStatus::Skipped | DeliveryStatus::Pending => {
                                report.skipped += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(campaign.id = %id, customer.id = %customer.id, error = %e, "Campaign message not logged");
                    report.failed += 1;
                }
            }
        }

        self.database
            .complete_campaign(id, report.sent, report.failed)
            .await?;
        AppLogger::log_campaign_dispatched(
            &id.to_string(),
            report.sent,
            report.failed,
            report.skipped,
        );
        Ok(report)
    }

    /// Send every Scheduled campaign whose time has come
    ///
    /// # Errors
    ///
    /// Returns an error if the due list cannot be loaded; individual campaign
    /// failures are logged
    pub async fn dispatch_due(&self, now: NaiveDateTime) -> AppResult<usize> {
        let mut dispatched = 0;
        for campaign in self.database.due_campaigns(now).await? {
            match self.send(campaign.id, now).await {
                Ok(_) => dispatched += 1,
                Err(e) => {
                    warn!(campaign.id = %campaign.id, error = %e, "Scheduled campaign not sent");
                }
            }
        }
        Ok(dispatched)
    }
}

fn audience(
    campaign: &Campaign,
    summaries: Vec<CustomerSummary>,
    now: NaiveDateTime,
) -> AudiencePreview {
    let today = now.date();
    let members: Vec<Customer> = summaries
        .into_iter()
        .filter(|s| campaign.segment.matches(s, today))
        .map(|s| s.customer)
        .collect();
    let matched = members.len();
    let recipients: Vec<Customer> = members
        .into_iter()
        .filter(|c| marketing_address(c, campaign.channel).is_some())
        .collect();
    AudiencePreview {
        matched,
        reachable: recipients.len(),
        recipients,
    }
}
