// ABOUTME: Marketing campaign database operations
// ABOUTME: Segments are persisted as tagged JSON; counters track dispatch results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{
    enum_col, fmt_local, fmt_utc, json_col, opt_local_col, u32_col, utc_col, uuid_col,
};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AudienceSegment, Campaign, CampaignStatus, NotificationChannel};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Create payload for a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    /// Internal name
    pub name: String,
    /// Delivery channel
    pub channel: NotificationChannel,
    /// Email subject
    #[serde(default)]
    pub subject: Option<String>,
    /// Body template
    pub body: String,
    /// Audience
    pub segment: AudienceSegment,
}

/// Partial update for an editable campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignUpdate {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New channel
    #[serde(default)]
    pub channel: Option<NotificationChannel>,
    /// New subject
    #[serde(default)]
    pub subject: Option<String>,
    /// New body
    #[serde(default)]
    pub body: Option<String>,
    /// New audience
    #[serde(default)]
    pub segment: Option<AudienceSegment>,
}

fn row_to_campaign(row: &SqliteRow) -> AppResult<Campaign> {
    Ok(Campaign {
        id: uuid_col(row, "id")?,
        name: row.try_get("name")?,
        channel: enum_col(row, "channel", NotificationChannel::parse)?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        segment: json_col(row, "segment")?,
        status: enum_col(row, "status", CampaignStatus::parse)?,
        scheduled_for: opt_local_col(row, "scheduled_for")?,
        sent_count: u32_col(row, "sent_count")?,
        failed_count: u32_col(row, "failed_count")?,
        created_at: utc_col(row, "created_at")?,
        updated_at: utc_col(row, "updated_at")?,
    })
}

impl Database {
    /// Insert a Draft campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_campaign(&self, new: &NewCampaign) -> AppResult<Campaign> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO campaigns (id, name, channel, subject, body, segment, status,
                sent_count, failed_count, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'draft', 0, 0, ?7, ?7)
            ",
        )
        .bind(id.to_string())
        .bind(new.name.trim())
        .bind(new.channel.as_str())
        .bind(&new.subject)
        .bind(&new.body)
        .bind(serde_json::to_string(&new.segment)?)
        .bind(fmt_utc(Utc::now()))
        .execute(&self.pool)
        .await?;

        self.get_campaign(id)
            .await?
            .ok_or_else(|| AppError::internal("Campaign vanished after insert"))
    }

    /// Find a campaign by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_campaign(&self, id: Uuid) -> AppResult<Option<Campaign>> {
        let row = sqlx::query("SELECT * FROM campaigns WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_campaign).transpose()
    }

    /// List campaigns, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_campaigns(&self) -> AppResult<Vec<Campaign>> {
        let rows = sqlx::query("SELECT * FROM campaigns ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_campaign).collect()
    }

    /// Store the full editable content of a Draft or Scheduled campaign
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// once sending started
    pub async fn save_campaign_content(&self, campaign: &Campaign) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE campaigns SET name = ?1, channel = ?2, subject = ?3, body = ?4, segment = ?5,
                updated_at = ?6
            WHERE id = ?7 AND status IN ('draft', 'scheduled')
            ",
        )
        .bind(&campaign.name)
        .bind(campaign.channel.as_str())
        .bind(&campaign.subject)
        .bind(&campaign.body)
        .bind(serde_json::to_string(&campaign.segment)?)
        .bind(fmt_utc(Utc::now()))
        .bind(campaign.id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(self.campaign_not_editable(campaign.id, "edited").await);
        }
        Ok(())
    }

    /// Move a Draft or Scheduled campaign to `status` and set its send time
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// once sending started
    pub async fn set_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        scheduled_for: Option<NaiveDateTime>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE campaigns SET status = ?1, scheduled_for = ?2, updated_at = ?3
            WHERE id = ?4 AND status IN ('draft', 'scheduled')
            ",
        )
        .bind(status.as_str())
        .bind(scheduled_for.map(fmt_local))
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(self.campaign_not_editable(id, status.as_str()).await);
        }
        Ok(())
    }

    async fn campaign_not_editable(&self, id: Uuid, action: &str) -> AppError {
        match self.get_campaign(id).await {
            Ok(Some(campaign)) => AppError::locked(format!(
                "A {} campaign cannot be {action}",
                campaign.status
            )),
            Ok(None) => AppError::not_found("Campaign"),
            Err(e) => e,
        }
    }

    /// Claim a campaign for dispatch: only one caller moves it to Sending
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn claim_campaign_for_sending(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE campaigns SET status = 'sending', updated_at = ?1
            WHERE id = ?2 AND status IN ('draft', 'scheduled')
            ",
        )
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Hand a claimed campaign back as `status` when dispatch could not start
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn release_campaign_claim(&self, id: Uuid, status: CampaignStatus) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE campaigns SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'sending'
            ",
        )
        .bind(status.as_str())
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Finish a dispatch with its counters
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn complete_campaign(&self, id: Uuid, sent: u32, failed: u32) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE campaigns
            SET status = 'sent', sent_count = ?1, failed_count = ?2, updated_at = ?3
            WHERE id = ?4 AND status = 'sending'
            ",
        )
        .bind(i64::from(sent))
        .bind(i64::from(failed))
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Scheduled campaigns whose send time is at or before `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn due_campaigns(&self, now: NaiveDateTime) -> AppResult<Vec<Campaign>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM campaigns
            WHERE status = 'scheduled' AND scheduled_for IS NOT NULL AND scheduled_for <= ?1
            ORDER BY scheduled_for
            ",
        )
        .bind(fmt_local(now))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_campaign).collect()
    }
}
