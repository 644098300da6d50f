// ABOUTME: SQLite database management for the salon back-office
// ABOUTME: Owns the connection pool, runs idempotent migrations and hosts per-entity operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Database Management
//!
//! Every entity gets its own file with an `impl Database` block. Identifiers
//! are stored as UUID text, UTC timestamps as RFC 3339 text, salon-local
//! appointment times as `YYYY-MM-DDTHH:MM:SS` text (sortable, so range
//! queries compare strings), and lists as JSON arrays.

mod appointments;
mod campaigns;
mod catalog;
mod customers;
mod notifications;
mod pets;
mod report_cards;
mod rows;
pub mod system_settings;
mod users;
mod waitlist;

pub use appointments::{AppointmentFilter, NewAppointment};
pub use campaigns::{CampaignUpdate, NewCampaign};
pub use catalog::{AddonInput, ServiceInput};
pub use customers::{CustomerInput, CustomerSearch, CustomerSummary};
pub use notifications::{NewNotificationLog, NotificationLogFilter};
pub use pets::PetInput;
pub use report_cards::NewReportCard;
pub use waitlist::NewWaitlistEntry;

use crate::errors::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Database manager for all salon records
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if necessary) the database and run migrations
    ///
    /// In-memory databases are pinned to a single long-lived connection:
    /// each `SQLite` memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration statement fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };
        db.migrate().await?;
        db.seed_default_catalog().await?;

        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Schema, in dependency order
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS staff_users (
        id TEXT PRIMARY KEY,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        display_name TEXT NOT NULL,
        role TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT UNIQUE,
        phone TEXT,
        preferred_channel TEXT NOT NULL DEFAULT 'sms',
        sms_opt_in INTEGER NOT NULL DEFAULT 1,
        email_opt_in INTEGER NOT NULL DEFAULT 1,
        marketing_opt_in INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_customers_phone ON customers(phone)",
    r"
    CREATE TABLE IF NOT EXISTS pets (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        species TEXT NOT NULL,
        breed TEXT,
        size TEXT NOT NULL,
        weight_lbs REAL,
        birth_date TEXT,
        temperament_notes TEXT,
        medical_notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_pets_customer ON pets(customer_id)",
    r"
    CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        description TEXT,
        duration_minutes INTEGER NOT NULL,
        price_small_cents INTEGER NOT NULL,
        price_medium_cents INTEGER NOT NULL,
        price_large_cents INTEGER NOT NULL,
        price_xlarge_cents INTEGER NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS addons (
        id TEXT PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        price_cents INTEGER NOT NULL,
        duration_minutes INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES customers(id),
        pet_id TEXT NOT NULL REFERENCES pets(id),
        service_id TEXT NOT NULL REFERENCES services(id),
        groomer_id TEXT REFERENCES staff_users(id) ON DELETE SET NULL,
        addon_ids TEXT NOT NULL DEFAULT '[]',
        scheduled_at TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        total_price_cents INTEGER NOT NULL,
        status TEXT NOT NULL,
        source TEXT NOT NULL,
        notes TEXT,
        cancellation_reason TEXT,
        reminder_sent_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_appointments_scheduled ON appointments(scheduled_at)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_customer ON appointments(customer_id)",
    r"
    CREATE TABLE IF NOT EXISTS waitlist_entries (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        pet_id TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
        service_id TEXT NOT NULL REFERENCES services(id),
        requested_date TEXT NOT NULL,
        time_preference TEXT NOT NULL DEFAULT 'any',
        priority INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'active',
        notification_attempts INTEGER NOT NULL DEFAULT 0,
        last_notified_at TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_waitlist_status_date ON waitlist_entries(status, requested_date)",
    r"
    CREATE TABLE IF NOT EXISTS waitlist_offers (
        id TEXT PRIMARY KEY,
        waitlist_entry_id TEXT NOT NULL REFERENCES waitlist_entries(id) ON DELETE CASCADE,
        slot_start TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        service_id TEXT NOT NULL REFERENCES services(id),
        response_token TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        appointment_id TEXT REFERENCES appointments(id) ON DELETE SET NULL,
        created_at TEXT NOT NULL,
        responded_at TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_offers_status_expiry ON waitlist_offers(status, expires_at)",
    r"
    CREATE TABLE IF NOT EXISTS campaigns (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        channel TEXT NOT NULL,
        subject TEXT,
        body TEXT NOT NULL,
        segment TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft',
        scheduled_for TEXT,
        sent_count INTEGER NOT NULL DEFAULT 0,
        failed_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS notification_logs (
        id TEXT PRIMARY KEY,
        customer_id TEXT REFERENCES customers(id) ON DELETE SET NULL,
        appointment_id TEXT REFERENCES appointments(id) ON DELETE SET NULL,
        campaign_id TEXT REFERENCES campaigns(id) ON DELETE SET NULL,
        channel TEXT NOT NULL,
        kind TEXT NOT NULL,
        recipient TEXT NOT NULL,
        subject TEXT,
        body TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        provider_message_id TEXT,
        error_message TEXT,
        attempts INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        sent_at TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_notification_logs_created ON notification_logs(created_at)",
    r"
    CREATE TABLE IF NOT EXISTS report_cards (
        id TEXT PRIMARY KEY,
        appointment_id TEXT UNIQUE NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
        groomer_notes TEXT NOT NULL,
        behavior_rating INTEGER NOT NULL,
        coat_condition TEXT,
        photo_urls TEXT NOT NULL DEFAULT '[]',
        recommendations TEXT,
        next_visit_weeks INTEGER,
        sent_at TEXT,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS system_settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let services = db.list_services(false).await.unwrap();
        assert!(!services.is_empty());
    }
}
