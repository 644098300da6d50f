// ABOUTME: Appointment database operations
// ABOUTME: Day and window queries for availability, status updates and reminder bookkeeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{
    enum_col, fmt_local, fmt_utc, json_col, local_col, opt_utc_col, opt_uuid_col, u32_col,
    utc_col, uuid_col,
};
use super::Database;
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus, BookingSource};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Fields of an appointment about to be stored
#[derive(Debug, Clone)]
pub struct NewAppointment {
    /// Customer
    pub customer_id: Uuid,
    /// Pet
    pub pet_id: Uuid,
    /// Service
    pub service_id: Uuid,
    /// Assigned groomer
    pub groomer_id: Option<Uuid>,
    /// Add-ons
    pub addon_ids: Vec<Uuid>,
    /// Salon-local start
    pub scheduled_at: NaiveDateTime,
    /// Total minutes
    pub duration_minutes: u32,
    /// Quoted total (cents)
    pub total_price_cents: i64,
    /// Initial status
    pub status: AppointmentStatus,
    /// Booking channel
    pub source: BookingSource,
    /// Notes
    pub notes: Option<String>,
}

/// Appointment list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    /// Only this salon-local day
    pub date: Option<NaiveDate>,
    /// Only this status
    pub status: Option<AppointmentStatus>,
    /// Only this customer
    pub customer_id: Option<Uuid>,
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

fn row_to_appointment(row: &SqliteRow) -> AppResult<Appointment> {
    Ok(Appointment {
        id: uuid_col(row, "id")?,
        customer_id: uuid_col(row, "customer_id")?,
        pet_id: uuid_col(row, "pet_id")?,
        service_id: uuid_col(row, "service_id")?,
        groomer_id: opt_uuid_col(row, "groomer_id")?,
        addon_ids: json_col(row, "addon_ids")?,
        scheduled_at: local_col(row, "scheduled_at")?,
        duration_minutes: u32_col(row, "duration_minutes")?,
        total_price_cents: row.try_get("total_price_cents")?,
        status: enum_col(row, "status", AppointmentStatus::parse)?,
        source: enum_col(row, "source", BookingSource::parse)?,
        notes: row.try_get("notes")?,
        cancellation_reason: row.try_get("cancellation_reason")?,
        reminder_sent_at: opt_utc_col(row, "reminder_sent_at")?,
        created_at: utc_col(row, "created_at")?,
        updated_at: utc_col(row, "updated_at")?,
    })
}

fn day_bounds(date: NaiveDate) -> (String, String) {
    let start = date.and_time(chrono::NaiveTime::MIN);
    (fmt_local(start), fmt_local(start + Duration::days(1)))
}

impl Database {
    /// Insert an appointment
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when a referenced record does not exist
    pub async fn create_appointment(&self, new: &NewAppointment) -> AppResult<Appointment> {
        let id = Uuid::new_v4();
        let now = fmt_utc(Utc::now());
        let addon_ids: Vec<String> = new.addon_ids.iter().map(Uuid::to_string).collect();

        sqlx::query(
            r"
            INSERT INTO appointments (id, customer_id, pet_id, service_id, groomer_id, addon_ids,
                scheduled_at, duration_minutes, total_price_cents, status, source, notes,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            ",
        )
        .bind(id.to_string())
        .bind(new.customer_id.to_string())
        .bind(new.pet_id.to_string())
        .bind(new.service_id.to_string())
        .bind(new.groomer_id.map(|g| g.to_string()))
        .bind(serde_json::to_string(&addon_ids)?)
        .bind(fmt_local(new.scheduled_at))
        .bind(i64::from(new.duration_minutes))
        .bind(new.total_price_cents)
        .bind(new.status.as_str())
        .bind(new.source.as_str())
        .bind(&new.notes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_appointment(id)
            .await?
            .ok_or_else(|| AppError::internal("Appointment vanished after insert"))
    }

    /// Find an appointment by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_appointment(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_appointment).transpose()
    }

    /// List appointments in start order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> AppResult<Vec<Appointment>> {
        let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let (day_start, day_end) = filter.date.map(day_bounds).unzip();

        let rows = sqlx::query(
            r"
            SELECT * FROM appointments
            WHERE (?1 IS NULL OR scheduled_at >= ?1)
              AND (?2 IS NULL OR scheduled_at < ?2)
              AND (?3 IS NULL OR status = ?3)
              AND (?4 IS NULL OR customer_id = ?4)
            ORDER BY scheduled_at
            LIMIT ?5 OFFSET ?6
            ",
        )
        .bind(day_start)
        .bind(day_end)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.customer_id.map(|c| c.to_string()))
        .bind(i64::from(limit))
        .bind(i64::from(filter.offset.unwrap_or(0)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    /// Every appointment (any status) starting on a salon-local day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn appointments_on_date(&self, date: NaiveDate) -> AppResult<Vec<Appointment>> {
        let (start, end) = day_bounds(date);
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE scheduled_at >= ?1 AND scheduled_at < ?2 ORDER BY scheduled_at",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    /// Move an appointment from `from` to `to`, recording the reason for
    /// cancellations
    ///
    /// The update only applies while the stored status is still `from`.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// when another change got there first
    pub async fn update_appointment_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        cancellation_reason: Option<&str>,
    ) -> AppResult<Appointment> {
        let result = sqlx::query(
            r"
            UPDATE appointments
            SET status = ?1,
                cancellation_reason = COALESCE(?2, cancellation_reason),
                updated_at = ?3
            WHERE id = ?4 AND status = ?5
            ",
        )
        .bind(to.as_str())
        .bind(cancellation_reason)
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        let current = self
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::locked(format!(
                "Appointment is now {}, not {from}",
                current.status
            )));
        }
        Ok(current)
    }

    /// Move a pending or confirmed appointment; the reminder is re-armed for
    /// the new time
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// when the appointment left pending/confirmed meanwhile
    pub async fn reschedule_appointment(
        &self,
        id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> AppResult<Appointment> {
        let result = sqlx::query(
            r"
            UPDATE appointments
            SET scheduled_at = ?1, reminder_sent_at = NULL, updated_at = ?2
            WHERE id = ?3 AND status IN ('pending', 'confirmed')
            ",
        )
        .bind(fmt_local(scheduled_at))
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        let current = self
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::locked(format!(
                "A {} appointment cannot be rescheduled",
                current.status
            )));
        }
        Ok(current)
    }

    /// Pending or confirmed appointments starting in `[from, to)` with no reminder yet
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn appointments_due_for_reminder(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM appointments
            WHERE status IN ('pending', 'confirmed')
              AND reminder_sent_at IS NULL
              AND scheduled_at >= ?1 AND scheduled_at < ?2
            ORDER BY scheduled_at
            ",
        )
        .bind(fmt_local(from))
        .bind(fmt_local(to))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    /// Stamp the reminder time
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_reminder_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE appointments SET reminder_sent_at = ?1 WHERE id = ?2")
            .bind(fmt_utc(at))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
