// ABOUTME: Waitlist entry and slot offer database operations
// ABOUTME: Tracks entry status and attempt counts alongside the offers sent for freed slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{
    date_col, enum_col, fmt_date, fmt_local, fmt_utc, local_col, opt_utc_col, opt_uuid_col,
    u32_col, utc_col, uuid_col,
};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{OfferStatus, SlotOffer, TimePreference, WaitlistEntry, WaitlistStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Fields of a waitlist entry about to be stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWaitlistEntry {
    /// Customer
    pub customer_id: Uuid,
    /// Pet
    pub pet_id: Uuid,
    /// Wanted service
    pub service_id: Uuid,
    /// Preferred day
    pub requested_date: NaiveDate,
    /// Morning, afternoon or any
    #[serde(default)]
    pub time_preference: TimePreference,
    /// Staff-assigned priority
    #[serde(default)]
    pub priority: i32,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

fn row_to_entry(row: &SqliteRow) -> AppResult<WaitlistEntry> {
    let priority: i64 = row.try_get("priority")?;
    Ok(WaitlistEntry {
        id: uuid_col(row, "id")?,
        customer_id: uuid_col(row, "customer_id")?,
        pet_id: uuid_col(row, "pet_id")?,
        service_id: uuid_col(row, "service_id")?,
        requested_date: date_col(row, "requested_date")?,
        time_preference: enum_col(row, "time_preference", TimePreference::parse)?,
        priority: i32::try_from(priority)
            .map_err(|_| AppError::database(format!("Priority {priority} out of range")))?,
        status: enum_col(row, "status", WaitlistStatus::parse)?,
        notification_attempts: u32_col(row, "notification_attempts")?,
        last_notified_at: opt_utc_col(row, "last_notified_at")?,
        notes: row.try_get("notes")?,
        created_at: utc_col(row, "created_at")?,
        updated_at: utc_col(row, "updated_at")?,
    })
}

fn row_to_offer(row: &SqliteRow) -> AppResult<SlotOffer> {
    Ok(SlotOffer {
        id: uuid_col(row, "id")?,
        waitlist_entry_id: uuid_col(row, "waitlist_entry_id")?,
        slot_start: local_col(row, "slot_start")?,
        duration_minutes: u32_col(row, "duration_minutes")?,
        service_id: uuid_col(row, "service_id")?,
        response_token: row.try_get("response_token")?,
        expires_at: local_col(row, "expires_at")?,
        status: enum_col(row, "status", OfferStatus::parse)?,
        appointment_id: opt_uuid_col(row, "appointment_id")?,
        created_at: utc_col(row, "created_at")?,
        responded_at: opt_utc_col(row, "responded_at")?,
    })
}

impl Database {
    /// Insert an Active waitlist entry
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when a referenced record does not exist
    pub async fn create_waitlist_entry(&self, new: &NewWaitlistEntry) -> AppResult<WaitlistEntry> {
        let id = Uuid::new_v4();
        let now = fmt_utc(Utc::now());
        sqlx::query(
            r"
            INSERT INTO waitlist_entries (id, customer_id, pet_id, service_id, requested_date,
                time_preference, priority, status, notification_attempts, notes,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active', 0, ?8, ?9, ?9)
            ",
        )
        .bind(id.to_string())
        .bind(new.customer_id.to_string())
        .bind(new.pet_id.to_string())
        .bind(new.service_id.to_string())
        .bind(fmt_date(new.requested_date))
        .bind(new.time_preference.as_str())
        .bind(new.priority)
        .bind(&new.notes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_waitlist_entry(id)
            .await?
            .ok_or_else(|| AppError::internal("Waitlist entry vanished after insert"))
    }

    /// Find a waitlist entry by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_waitlist_entry(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query("SELECT * FROM waitlist_entries WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    /// List entries, optionally by status, by requested date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_waitlist_entries(
        &self,
        status: Option<WaitlistStatus>,
    ) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM waitlist_entries
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY requested_date, priority DESC, created_at
            ",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_entry).collect()
    }

    /// Active entries for a service, the candidate pool for a freed slot
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn active_waitlist_for_service(
        &self,
        service_id: Uuid,
    ) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM waitlist_entries WHERE status = 'active' AND service_id = ?1 ORDER BY created_at",
        )
        .bind(service_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_entry).collect()
    }

    /// Set an entry's status
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update_waitlist_status(&self, id: Uuid, status: WaitlistStatus) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE waitlist_entries SET status = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(status.as_str())
                .bind(fmt_utc(Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Waitlist entry"));
        }
        Ok(())
    }

    /// Claim an Active entry for an offer: mark it Offered and count the attempt
    ///
    /// Returns `false` when the entry is no longer Active, for example because
    /// a concurrent offer claimed it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn record_waitlist_offer(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let stamp = fmt_utc(at);
        let result = sqlx::query(
            r"
            UPDATE waitlist_entries
            SET status = 'offered',
                notification_attempts = notification_attempts + 1,
                last_notified_at = ?1,
                updated_at = ?1
            WHERE id = ?2 AND status = 'active'
            ",
        )
        .bind(&stamp)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Store a new slot offer
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_offer(&self, offer: &SlotOffer) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO waitlist_offers (id, waitlist_entry_id, slot_start, duration_minutes,
                service_id, response_token, expires_at, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(offer.id.to_string())
        .bind(offer.waitlist_entry_id.to_string())
        .bind(fmt_local(offer.slot_start))
        .bind(i64::from(offer.duration_minutes))
        .bind(offer.service_id.to_string())
        .bind(&offer.response_token)
        .bind(fmt_local(offer.expires_at))
        .bind(offer.status.as_str())
        .bind(fmt_utc(offer.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Find an offer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_offer(&self, id: Uuid) -> AppResult<Option<SlotOffer>> {
        let row = sqlx::query("SELECT * FROM waitlist_offers WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_offer).transpose()
    }

    /// Offers sent to one entry, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn offers_for_entry(&self, entry_id: Uuid) -> AppResult<Vec<SlotOffer>> {
        let rows = sqlx::query(
            "SELECT * FROM waitlist_offers WHERE waitlist_entry_id = ?1 ORDER BY created_at DESC",
        )
        .bind(entry_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_offer).collect()
    }

    /// Close a pending offer
    ///
    /// Only a Pending offer changes; the return value says whether this call
    /// closed it, so two racing responses cannot both win.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn close_offer(
        &self,
        id: Uuid,
        status: OfferStatus,
        appointment_id: Option<Uuid>,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE waitlist_offers
            SET status = ?1, appointment_id = ?2, responded_at = ?3
            WHERE id = ?4 AND status = 'pending'
            ",
        )
        .bind(status.as_str())
        .bind(appointment_id.map(|a| a.to_string()))
        .bind(fmt_utc(responded_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Attach the booked appointment to an accepted offer
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn link_offer_appointment(&self, id: Uuid, appointment_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE waitlist_offers SET appointment_id = ?1 WHERE id = ?2")
            .bind(appointment_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Pending offers whose deadline is at or before `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn overdue_offers(&self, now: NaiveDateTime) -> AppResult<Vec<SlotOffer>> {
        let rows = sqlx::query(
            "SELECT * FROM waitlist_offers WHERE status = 'pending' AND expires_at <= ?1 ORDER BY expires_at",
        )
        .bind(fmt_local(now))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_offer).collect()
    }
}
