// ABOUTME: Notification log database operations
// ABOUTME: Every SMS and email gets a row that moves from pending to sent, failed or skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{enum_col, fmt_utc, opt_utc_col, opt_uuid_col, u32_col, utc_col, uuid_col};
use super::Database;
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};
use crate::models::{DeliveryStatus, NotificationChannel, NotificationKind, NotificationLog};
use chrono::Utc;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// A message about to be attempted
#[derive(Debug, Clone)]
pub struct NewNotificationLog {
    /// Recipient customer
    pub customer_id: Option<Uuid>,
    /// Related appointment
    pub appointment_id: Option<Uuid>,
    /// Related campaign
    pub campaign_id: Option<Uuid>,
    /// Channel
    pub channel: NotificationChannel,
    /// Message kind
    pub kind: NotificationKind,
    /// Phone (E.164) or email address
    pub recipient: String,
    /// Email subject
    pub subject: Option<String>,
    /// Rendered body
    pub body: String,
}

/// Notification log list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationLogFilter {
    /// Only this customer
    pub customer_id: Option<Uuid>,
    /// Only this appointment
    pub appointment_id: Option<Uuid>,
    /// Only this delivery status
    pub status: Option<DeliveryStatus>,
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

fn row_to_log(row: &SqliteRow) -> AppResult<NotificationLog> {
    Ok(NotificationLog {
        id: uuid_col(row, "id")?,
        customer_id: opt_uuid_col(row, "customer_id")?,
        appointment_id: opt_uuid_col(row, "appointment_id")?,
        campaign_id: opt_uuid_col(row, "campaign_id")?,
        channel: enum_col(row, "channel", NotificationChannel::parse)?,
        kind: enum_col(row, "kind", NotificationKind::parse)?,
        recipient: row.try_get("recipient")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        status: enum_col(row, "status", DeliveryStatus::parse)?,
        provider_message_id: row.try_get("provider_message_id")?,
        error_message: row.try_get("error_message")?,
        attempts: u32_col(row, "attempts")?,
        created_at: utc_col(row, "created_at")?,
        sent_at: opt_utc_col(row, "sent_at")?,
    })
}

impl Database {
    /// Insert a Pending log row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_notification_log(
        &self,
        new: &NewNotificationLog,
    ) -> AppResult<NotificationLog> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO notification_logs (id, customer_id, appointment_id, campaign_id, channel,
                kind, recipient, subject, body, status, attempts, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', 0, ?10)
            ",
        )
        .bind(id.to_string())
        .bind(new.customer_id.map(|c| c.to_string()))
        .bind(new.appointment_id.map(|a| a.to_string()))
        .bind(new.campaign_id.map(|c| c.to_string()))
        .bind(new.channel.as_str())
        .bind(new.kind.as_str())
        .bind(&new.recipient)
        .bind(&new.subject)
        .bind(&new.body)
        .bind(fmt_utc(Utc::now()))
        .execute(&self.pool)
        .await?;

        self.get_notification_log(id)
            .await?
            .ok_or_else(|| AppError::internal("Notification log vanished after insert"))
    }

    /// Find a log row by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_notification_log(&self, id: Uuid) -> AppResult<Option<NotificationLog>> {
        let row = sqlx::query("SELECT * FROM notification_logs WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_log).transpose()
    }

    /// Record a delivery attempt outcome and count it
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn record_notification_attempt(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        provider_message_id: Option<&str>,
        error_message: Option<&str>,
    ) -> AppResult<NotificationLog> {
        let now = fmt_utc(Utc::now());
        let sent_at = (status == DeliveryStatus::Sent).then_some(now.as_str());
        let result = sqlx::query(
            r"
            UPDATE notification_logs
            SET status = ?1,
                provider_message_id = COALESCE(?2, provider_message_id),
                error_message = ?3,
                attempts = attempts + 1,
                sent_at = COALESCE(?4, sent_at)
            WHERE id = ?5
            ",
        )
        .bind(status.as_str())
        .bind(provider_message_id)
        .bind(error_message)
        .bind(sent_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification log"));
        }
        self.get_notification_log(id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification log"))
    }

    /// Mark a row Skipped without counting an attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn skip_notification(&self, id: Uuid, reason: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_logs SET status = 'skipped', error_message = ?1 WHERE id = ?2",
        )
        .bind(reason)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List log rows, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_notification_logs(
        &self,
        filter: &NotificationLogFilter,
    ) -> AppResult<Vec<NotificationLog>> {
        let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let rows = sqlx::query(
            r"
            SELECT * FROM notification_logs
            WHERE (?1 IS NULL OR customer_id = ?1)
              AND (?2 IS NULL OR appointment_id = ?2)
              AND (?3 IS NULL OR status = ?3)
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            ",
        )
        .bind(filter.customer_id.map(|c| c.to_string()))
        .bind(filter.appointment_id.map(|a| a.to_string()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(i64::from(limit))
        .bind(i64::from(filter.offset.unwrap_or(0)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_log).collect()
    }
}
