// ABOUTME: Customer database operations and campaign audience summaries
// ABOUTME: Phones are stored in E.164 form so walk-in lookups match however the number was typed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{enum_col, fmt_utc, opt_local_col, utc_col, uuid_col};
use super::Database;
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};
use crate::formatters::normalize_phone;
use crate::models::{ContactPreference, Customer, PetSize, PetSpecies};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

/// Create/update payload for a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number in any common format
    #[serde(default)]
    pub phone: Option<String>,
    /// Preferred channel
    #[serde(default)]
    pub preferred_channel: ContactPreference,
    /// Transactional SMS consent
    #[serde(default = "default_true")]
    pub sms_opt_in: bool,
    /// Transactional email consent
    #[serde(default = "default_true")]
    pub email_opt_in: bool,
    /// Marketing consent
    #[serde(default)]
    pub marketing_opt_in: bool,
    /// Staff notes
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Customer list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSearch {
    /// Matches name, email or phone
    pub query: Option<String>,
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

/// Everything campaign segments need to know about a customer
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    /// The customer
    pub customer: Customer,
    /// Species of the customer's active pets
    pub species: Vec<PetSpecies>,
    /// Sizes of the customer's active pets
    pub sizes: Vec<PetSize>,
    /// Start of the most recent completed appointment
    pub last_visit: Option<NaiveDateTime>,
    /// When the customer record was created
    pub first_seen: DateTime<Utc>,
}

fn row_to_customer(row: &SqliteRow) -> AppResult<Customer> {
    Ok(Customer {
        id: uuid_col(row, "id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        preferred_channel: enum_col(row, "preferred_channel", ContactPreference::parse)?,
        sms_opt_in: row.try_get("sms_opt_in")?,
        email_opt_in: row.try_get("email_opt_in")?,
        marketing_opt_in: row.try_get("marketing_opt_in")?,
        notes: row.try_get("notes")?,
        created_at: utc_col(row, "created_at")?,
        updated_at: utc_col(row, "updated_at")?,
    })
}

fn clean_email(email: Option<&String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn clean_phone(phone: Option<&String>) -> Option<String> {
    phone
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| normalize_phone(p).unwrap_or_else(|| p.to_owned()))
}

impl Database {
    /// Insert a customer
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the email belongs to another customer
    pub async fn create_customer(&self, input: &CustomerInput) -> AppResult<Customer> {
        let id = Uuid::new_v4();
        let now = fmt_utc(Utc::now());
        sqlx::query(
            r"
            INSERT INTO customers (id, first_name, last_name, email, phone, preferred_channel,
                sms_opt_in, email_opt_in, marketing_opt_in, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            ",
        )
        .bind(id.to_string())
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(clean_email(input.email.as_ref()))
        .bind(clean_phone(input.phone.as_ref()))
        .bind(input.preferred_channel.as_str())
        .bind(input.sms_opt_in)
        .bind(input.email_opt_in)
        .bind(input.marketing_opt_in)
        .bind(&input.notes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_customer(id)
            .await?
            .ok_or_else(|| AppError::internal("Customer vanished after insert"))
    }

    /// Find a customer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_customer).transpose()
    }

    /// Find a customer by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE email = ?1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_customer).transpose()
    }

    /// Find a customer by phone in any format
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_customer_by_phone(&self, phone: &str) -> AppResult<Option<Customer>> {
        let Some(normalized) = normalize_phone(phone) else {
            return Ok(None);
        };
        let row =
            sqlx::query("SELECT * FROM customers WHERE phone = ?1 ORDER BY created_at LIMIT 1")
                .bind(normalized)
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(row_to_customer).transpose()
    }

    /// Replace a customer's editable fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update_customer(&self, id: Uuid, input: &CustomerInput) -> AppResult<Customer> {
        let result = sqlx::query(
            r"
            UPDATE customers SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4,
                preferred_channel = ?5, sms_opt_in = ?6, email_opt_in = ?7,
                marketing_opt_in = ?8, notes = ?9, updated_at = ?10
            WHERE id = ?11
            ",
        )
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(clean_email(input.email.as_ref()))
        .bind(clean_phone(input.phone.as_ref()))
        .bind(input.preferred_channel.as_str())
        .bind(input.sms_opt_in)
        .bind(input.email_opt_in)
        .bind(input.marketing_opt_in)
        .bind(&input.notes)
        .bind(fmt_utc(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Customer"));
        }
        self.get_customer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))
    }

    /// Delete a customer and their pets
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `INVALID_INPUT` when
    /// appointments still reference the customer
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Customer"));
        }
        Ok(())
    }

    /// Search customers by name, email or phone
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search_customers(&self, search: &CustomerSearch) -> AppResult<Vec<Customer>> {
        let limit = search.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let offset = search.offset.unwrap_or(0);
        let term = search
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let rows = if let Some(term) = term {
            let pattern = format!("%{}%", term.to_lowercase());
            let phone_pattern =
                normalize_phone(term).map_or_else(|| pattern.clone(), |p| format!("%{p}%"));
            sqlx::query(
                r"
                SELECT * FROM customers
                WHERE lower(first_name || ' ' || last_name) LIKE ?1
                   OR lower(email) LIKE ?1
                   OR phone LIKE ?2
                ORDER BY last_name, first_name
                LIMIT ?3 OFFSET ?4
                ",
            )
            .bind(pattern)
            .bind(phone_pattern)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query("SELECT * FROM customers ORDER BY last_name, first_name LIMIT ?1 OFFSET ?2")
                .bind(i64::from(limit))
                .bind(i64::from(offset))
                .fetch_all(&self.pool)
                .await?
        };
        rows.iter().map(row_to_customer).collect()
    }

    /// Summaries of every customer for audience segmentation
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn customer_summaries(&self) -> AppResult<Vec<CustomerSummary>> {
        let customers = sqlx::query("SELECT * FROM customers ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        let mut pets_by_customer: HashMap<Uuid, (Vec<PetSpecies>, Vec<PetSize>)> = HashMap::new();
        let pet_rows =
            sqlx::query("SELECT customer_id, species, size FROM pets WHERE is_active = 1")
                .fetch_all(&self.pool)
                .await?;
        for row in &pet_rows {
            let entry = pets_by_customer
                .entry(uuid_col(row, "customer_id")?)
                .or_default();
            entry.0.push(enum_col(row, "species", PetSpecies::parse)?);
            entry.1.push(enum_col(row, "size", PetSize::parse)?);
        }

        let mut last_visits: HashMap<Uuid, NaiveDateTime> = HashMap::new();
        let visit_rows = sqlx::query(
            r"
            SELECT customer_id, MAX(scheduled_at) AS last_visit
            FROM appointments
            WHERE status = 'completed'
            GROUP BY customer_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &visit_rows {
            if let Some(visit) = opt_local_col(row, "last_visit")? {
                last_visits.insert(uuid_col(row, "customer_id")?, visit);
            }
        }

        customers
            .iter()
            .map(|row| {
                let customer = row_to_customer(row)?;
                let (species, sizes) = pets_by_customer.remove(&customer.id).unwrap_or_default();
                Ok(CustomerSummary {
                    last_visit: last_visits.get(&customer.id).copied(),
                    first_seen: customer.created_at,
                    species,
                    sizes,
                    customer,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(first: &str, email: &str, phone: &str) -> CustomerInput {
        CustomerInput {
            first_name: first.to_owned(),
            last_name: "Rivera".to_owned(),
            email: Some(email.to_owned()),
            phone: Some(phone.to_owned()),
            sms_opt_in: true,
            email_opt_in: true,
            ..CustomerInput::default()
        }
    }

    #[tokio::test]
    async fn test_phone_lookup_ignores_formatting() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let created = db
            .create_customer(&input("Ana", "Ana@Example.com", "(657) 252-2903"))
            .await
            .unwrap();
        assert_eq!(created.phone.as_deref(), Some("+16572522903"));
        assert_eq!(created.email.as_deref(), Some("ana@example.com"));

        let found = db.find_customer_by_phone("657.252.2903").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(created.id));
        assert!(db.find_customer_by_phone("12").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_matches_name_and_phone() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.create_customer(&input("Ana", "ana@example.com", "6572522903"))
            .await
            .unwrap();
        db.create_customer(&input("Ben", "ben@example.com", "7145550101"))
            .await
            .unwrap();

        let by_name = db
            .search_customers(&CustomerSearch {
                query: Some("ben riv".to_owned()),
                ..CustomerSearch::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);

        let all = db.search_customers(&CustomerSearch::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
