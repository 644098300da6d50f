// ABOUTME: Grooming service and add-on catalog database operations
// ABOUTME: Seeds a default menu on first start so a fresh install can take bookings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{u32_col, uuid_col};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Addon, GroomingService};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

/// Create/update payload for a grooming service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInput {
    /// Display name
    pub name: String,
    /// Menu description
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes the service takes
    pub duration_minutes: u32,
    /// Price for small pets (cents)
    pub price_small_cents: i64,
    /// Price for medium pets (cents)
    pub price_medium_cents: i64,
    /// Price for large pets (cents)
    pub price_large_cents: i64,
    /// Price for extra-large pets (cents)
    pub price_xlarge_cents: i64,
    /// Bookable
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Create/update payload for an add-on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonInput {
    /// Display name
    pub name: String,
    /// Price (cents)
    pub price_cents: i64,
    /// Extra minutes
    #[serde(default)]
    pub duration_minutes: u32,
    /// Bookable
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

fn row_to_service(row: &SqliteRow) -> AppResult<GroomingService> {
    Ok(GroomingService {
        id: uuid_col(row, "id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        duration_minutes: u32_col(row, "duration_minutes")?,
        price_small_cents: row.try_get("price_small_cents")?,
        price_medium_cents: row.try_get("price_medium_cents")?,
        price_large_cents: row.try_get("price_large_cents")?,
        price_xlarge_cents: row.try_get("price_xlarge_cents")?,
        is_active: row.try_get("is_active")?,
    })
}

fn row_to_addon(row: &SqliteRow) -> AppResult<Addon> {
    Ok(Addon {
        id: uuid_col(row, "id")?,
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        duration_minutes: u32_col(row, "duration_minutes")?,
        is_active: row.try_get("is_active")?,
    })
}

/// (name, description, minutes, small, medium, large, xlarge)
const DEFAULT_SERVICES: &[(&str, &str, u32, i64, i64, i64, i64)] = &[
    (
        "Bath & Brush",
        "Shampoo, blow-dry, brush-out, nail trim and ear cleaning",
        60,
        4500,
        5500,
        6500,
        8000,
    ),
    (
        "Full Groom",
        "Bath & Brush plus a full haircut styled to breed or request",
        90,
        6500,
        8000,
        9500,
        11500,
    ),
    (
        "Puppy Intro",
        "Gentle first visit for puppies under six months",
        45,
        3500,
        3500,
        4000,
        4000,
    ),
];

/// (name, cents, minutes)
const DEFAULT_ADDONS: &[(&str, i64, u32)] = &[
    ("Teeth Brushing", 1000, 10),
    ("De-shedding Treatment", 2000, 20),
    ("Blueberry Facial", 1200, 10),
    ("Nail Grinding", 800, 10),
];

impl Database {
    /// Seed the default menu when the catalog is empty
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn seed_default_catalog(&self) -> AppResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        for &(name, description, minutes, small, medium, large, xlarge) in DEFAULT_SERVICES {
            self.create_service(&ServiceInput {
                name: name.to_owned(),
                description: Some(description.to_owned()),
                duration_minutes: minutes,
                price_small_cents: small,
                price_medium_cents: medium,
                price_large_cents: large,
                price_xlarge_cents: xlarge,
                is_active: true,
            })
            .await?;
        }
        for &(name, cents, minutes) in DEFAULT_ADDONS {
            self.create_addon(&AddonInput {
                name: name.to_owned(),
                price_cents: cents,
                duration_minutes: minutes,
                is_active: true,
            })
            .await?;
        }

        info!(
            services = DEFAULT_SERVICES.len(),
            addons = DEFAULT_ADDONS.len(),
            "Seeded default service catalog"
        );
        Ok(())
    }

    /// Insert a service
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the name is taken
    pub async fn create_service(&self, input: &ServiceInput) -> AppResult<GroomingService> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO services (id, name, description, duration_minutes, price_small_cents,
                price_medium_cents, price_large_cents, price_xlarge_cents, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(id.to_string())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(i64::from(input.duration_minutes))
        .bind(input.price_small_cents)
        .bind(input.price_medium_cents)
        .bind(input.price_large_cents)
        .bind(input.price_xlarge_cents)
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;

        self.get_service(id)
            .await?
            .ok_or_else(|| AppError::internal("Service vanished after insert"))
    }

    /// Replace a service's fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update_service(
        &self,
        id: Uuid,
        input: &ServiceInput,
    ) -> AppResult<GroomingService> {
        let result = sqlx::query(
            r"
            UPDATE services SET name = ?1, description = ?2, duration_minutes = ?3,
                price_small_cents = ?4, price_medium_cents = ?5, price_large_cents = ?6,
                price_xlarge_cents = ?7, is_active = ?8
            WHERE id = ?9
            ",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(i64::from(input.duration_minutes))
        .bind(input.price_small_cents)
        .bind(input.price_medium_cents)
        .bind(input.price_large_cents)
        .bind(input.price_xlarge_cents)
        .bind(input.is_active)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Service"));
        }
        self.get_service(id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))
    }

    /// Find a service by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_service(&self, id: Uuid) -> AppResult<Option<GroomingService>> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_service).transpose()
    }

    /// List services by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_services(&self, active_only: bool) -> AppResult<Vec<GroomingService>> {
        let rows = sqlx::query(
            "SELECT * FROM services WHERE (?1 = 0 OR is_active = 1) ORDER BY duration_minutes, name",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_service).collect()
    }

    /// Insert an add-on
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the name is taken
    pub async fn create_addon(&self, input: &AddonInput) -> AppResult<Addon> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO addons (id, name, price_cents, duration_minutes, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id.to_string())
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(i64::from(input.duration_minutes))
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM addons WHERE id = ?1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;
        row_to_addon(&row)
    }

    /// Replace an add-on's fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update_addon(&self, id: Uuid, input: &AddonInput) -> AppResult<Addon> {
        let result = sqlx::query(
            r"
            UPDATE addons SET name = ?1, price_cents = ?2, duration_minutes = ?3, is_active = ?4
            WHERE id = ?5
            ",
        )
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(i64::from(input.duration_minutes))
        .bind(input.is_active)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Add-on"));
        }
        let row = sqlx::query("SELECT * FROM addons WHERE id = ?1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;
        row_to_addon(&row)
    }

    /// List add-ons by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_addons(&self, active_only: bool) -> AppResult<Vec<Addon>> {
        let rows = sqlx::query("SELECT * FROM addons WHERE (?1 = 0 OR is_active = 1) ORDER BY name")
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_addon).collect()
    }

    /// Fetch the add-ons with the given ids; unknown ids are simply absent
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_addons(&self, ids: &[Uuid]) -> AppResult<Vec<Addon>> {
        let all = self.list_addons(false).await?;
        Ok(all.into_iter().filter(|a| ids.contains(&a.id)).collect())
    }
}
