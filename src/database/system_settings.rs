// ABOUTME: System settings database operations for staff-configurable business options
// ABOUTME: Provides key/value get/set plus typed load/save of the business settings document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{fmt_utc, utc_col};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::BusinessSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// System setting key holding the business settings JSON document
pub const SETTING_BUSINESS: &str = "business_settings";

/// A system setting entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSetting {
    /// Unique key identifier for the setting
    pub key: String,
    /// The current value of the setting
    pub value: String,
    /// Human-readable description of what this setting controls
    pub description: Option<String>,
    /// When the setting was last modified
    pub updated_at: DateTime<Utc>,
}

impl Database {
    /// Get a system setting by key
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_system_setting(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        let row = sqlx::query(
            r"
            SELECT key, value, description, updated_at
            FROM system_settings
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get system setting: {e}")))?;

        row.map(|row| -> AppResult<SystemSetting> {
            Ok(SystemSetting {
                key: row.try_get("key")?,
                value: row.try_get("value")?,
                description: row.try_get("description")?,
                updated_at: utc_col(&row, "updated_at")?,
            })
        })
        .transpose()
    }

    /// Set a system setting value
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn set_system_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> AppResult<()> {
        let now = fmt_utc(Utc::now());

        sqlx::query(
            r"
            INSERT INTO system_settings (key, value, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = ?2,
                description = COALESCE(?3, description),
                updated_at = ?4
            ",
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set system setting: {e}")))?;

        Ok(())
    }

    /// Load the business settings, falling back to defaults when never saved
    ///
    /// Unknown or missing fields in the stored document take their default.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored JSON is malformed
    pub async fn load_business_settings(&self) -> AppResult<BusinessSettings> {
        match self.get_system_setting(SETTING_BUSINESS).await? {
            Some(setting) => serde_json::from_str(&setting.value).map_err(|e| {
                AppError::database(format!("Stored business settings are invalid: {e}"))
            }),
            None => Ok(BusinessSettings::default()),
        }
    }

    /// Persist the business settings document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails
    pub async fn save_business_settings(&self, settings: &BusinessSettings) -> AppResult<()> {
        let value = serde_json::to_string(settings)?;
        self.set_system_setting(
            SETTING_BUSINESS,
            &value,
            Some("Opening hours, scheduling and waitlist policy"),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_business_settings_default_then_saved() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let defaults = db.load_business_settings().await.unwrap();
        assert_eq!(defaults, BusinessSettings::default());

        let mut updated = defaults;
        updated.capacity = 3;
        updated.business_name = "Suds & Snips".to_owned();
        db.save_business_settings(&updated).await.unwrap();

        let loaded = db.load_business_settings().await.unwrap();
        assert_eq!(loaded.capacity, 3);
        assert_eq!(loaded.business_name, "Suds & Snips");

        let raw = db.get_system_setting(SETTING_BUSINESS).await.unwrap().unwrap();
        assert!(raw.description.is_some());
    }
}
