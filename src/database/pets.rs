// ABOUTME: Pet database operations
// ABOUTME: Pets belong to one customer; size is derived from weight when not given explicitly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{enum_col, fmt_date, fmt_utc, opt_date_col, utc_col, uuid_col};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Pet, PetSize, PetSpecies};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Create/update payload for a pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetInput {
    /// Pet name
    pub name: String,
    /// Species
    pub species: PetSpecies,
    /// Breed
    #[serde(default)]
    pub breed: Option<String>,
    /// Size class; derived from weight when omitted
    #[serde(default)]
    pub size: Option<PetSize>,
    /// Weight in pounds
    #[serde(default)]
    pub weight_lbs: Option<f64>,
    /// Birth date
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Handling notes
    #[serde(default)]
    pub temperament_notes: Option<String>,
    /// Allergies, medications, conditions
    #[serde(default)]
    pub medical_notes: Option<String>,
}

impl PetInput {
    /// Explicit size, else the weight class, else medium
    #[must_use]
    pub fn resolved_size(&self) -> PetSize {
        self.size
            .or_else(|| self.weight_lbs.map(PetSize::from_weight_lbs))
            .unwrap_or(PetSize::Medium)
    }
}

fn row_to_pet(row: &SqliteRow) -> AppResult<Pet> {
    Ok(Pet {
        id: uuid_col(row, "id")?,
        customer_id: uuid_col(row, "customer_id")?,
        name: row.try_get("name")?,
        species: enum_col(row, "species", PetSpecies::parse)?,
        breed: row.try_get("breed")?,
        size: enum_col(row, "size", PetSize::parse)?,
        weight_lbs: row.try_get("weight_lbs")?,
        birth_date: opt_date_col(row, "birth_date")?,
        temperament_notes: row.try_get("temperament_notes")?,
        medical_notes: row.try_get("medical_notes")?,
        is_active: row.try_get("is_active")?,
        created_at: utc_col(row, "created_at")?,
    })
}

impl Database {
    /// Insert a pet for a customer
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the customer does not exist
    pub async fn create_pet(&self, customer_id: Uuid, input: &PetInput) -> AppResult<Pet> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO pets (id, customer_id, name, species, breed, size, weight_lbs, birth_date,
                temperament_notes, medical_notes, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11)
            ",
        )
        .bind(id.to_string())
        .bind(customer_id.to_string())
        .bind(input.name.trim())
        .bind(input.species.as_str())
        .bind(&input.breed)
        .bind(input.resolved_size().as_str())
        .bind(input.weight_lbs)
        .bind(input.birth_date.map(fmt_date))
        .bind(&input.temperament_notes)
        .bind(&input.medical_notes)
        .bind(fmt_utc(Utc::now()))
        .execute(&self.pool)
        .await?;

        self.get_pet(id)
            .await?
            .ok_or_else(|| AppError::internal("Pet vanished after insert"))
    }

    /// Find a pet by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_pet(&self, id: Uuid) -> AppResult<Option<Pet>> {
        let row = sqlx::query("SELECT * FROM pets WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_pet).transpose()
    }

    /// Active pets of a customer, by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_pets_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Pet>> {
        let rows =
            sqlx::query("SELECT * FROM pets WHERE customer_id = ?1 AND is_active = 1 ORDER BY name")
                .bind(customer_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_pet).collect()
    }

    /// Replace a pet's editable fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update_pet(&self, id: Uuid, input: &PetInput) -> AppResult<Pet> {
        let result = sqlx::query(
            r"
            UPDATE pets SET name = ?1, species = ?2, breed = ?3, size = ?4, weight_lbs = ?5,
                birth_date = ?6, temperament_notes = ?7, medical_notes = ?8
            WHERE id = ?9
            ",
        )
        .bind(input.name.trim())
        .bind(input.species.as_str())
        .bind(&input.breed)
        .bind(input.resolved_size().as_str())
        .bind(input.weight_lbs)
        .bind(input.birth_date.map(fmt_date))
        .bind(&input.temperament_notes)
        .bind(&input.medical_notes)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Pet"));
        }
        self.get_pet(id).await?.ok_or_else(|| AppError::not_found("Pet"))
    }

    /// Hide a pet from booking while keeping its appointment history
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn deactivate_pet(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE pets SET is_active = 0 WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Pet"));
        }
        Ok(())
    }
}
