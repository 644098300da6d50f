// ABOUTME: Report card database operations
// ABOUTME: One card per appointment, enforced by a unique column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{fmt_utc, json_col, opt_u32_col, opt_utc_col, utc_col, uuid_col};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::ReportCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Create payload for a report card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReportCard {
    /// Completed appointment
    pub appointment_id: Uuid,
    /// What was done and how it went
    pub groomer_notes: String,
    /// 1 to 5
    pub behavior_rating: u8,
    /// Coat condition
    #[serde(default)]
    pub coat_condition: Option<String>,
    /// Photo URLs
    #[serde(default)]
    pub photo_urls: Vec<String>,
    /// Home-care recommendations
    #[serde(default)]
    pub recommendations: Option<String>,
    /// Suggested weeks until the next visit
    #[serde(default)]
    pub next_visit_weeks: Option<u32>,
}

fn row_to_card(row: &SqliteRow) -> AppResult<ReportCard> {
    let rating: i64 = row.try_get("behavior_rating")?;
    Ok(ReportCard {
        id: uuid_col(row, "id")?,
        appointment_id: uuid_col(row, "appointment_id")?,
        groomer_notes: row.try_get("groomer_notes")?,
        behavior_rating: u8::try_from(rating)
            .map_err(|_| AppError::database(format!("Rating {rating} out of range")))?,
        coat_condition: row.try_get("coat_condition")?,
        photo_urls: json_col(row, "photo_urls")?,
        recommendations: row.try_get("recommendations")?,
        next_visit_weeks: opt_u32_col(row, "next_visit_weeks")?,
        sent_at: opt_utc_col(row, "sent_at")?,
        created_at: utc_col(row, "created_at")?,
    })
}

impl Database {
    /// Insert a report card
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the appointment already has one
    pub async fn create_report_card(&self, new: &NewReportCard) -> AppResult<ReportCard> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO report_cards (id, appointment_id, groomer_notes, behavior_rating,
                coat_condition, photo_urls, recommendations, next_visit_weeks, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(id.to_string())
        .bind(new.appointment_id.to_string())
        .bind(new.groomer_notes.trim())
        .bind(i64::from(new.behavior_rating))
        .bind(&new.coat_condition)
        .bind(serde_json::to_string(&new.photo_urls)?)
        .bind(&new.recommendations)
        .bind(new.next_visit_weeks.map(i64::from))
        .bind(fmt_utc(Utc::now()))
        .execute(&self.pool)
        .await?;

        self.get_report_card(id)
            .await?
            .ok_or_else(|| AppError::internal("Report card vanished after insert"))
    }

    /// Find a report card by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_report_card(&self, id: Uuid) -> AppResult<Option<ReportCard>> {
        let row = sqlx::query("SELECT * FROM report_cards WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_card).transpose()
    }

    /// Find the report card of an appointment
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn report_card_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Option<ReportCard>> {
        let row = sqlx::query("SELECT * FROM report_cards WHERE appointment_id = ?1")
            .bind(appointment_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_card).transpose()
    }

    /// Stamp delivery time
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_report_card_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE report_cards SET sent_at = ?1 WHERE id = ?2")
            .bind(fmt_utc(at))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
