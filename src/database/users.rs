// ABOUTME: Staff user database operations
// ABOUTME: Create, look up and deactivate groomer and admin accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::rows::{enum_col, fmt_utc, utc_col, uuid_col};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{StaffUser, UserRole};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_user(row: &SqliteRow) -> AppResult<StaffUser> {
    Ok(StaffUser {
        id: uuid_col(row, "id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        role: enum_col(row, "role", UserRole::parse)?,
        is_active: row.try_get("is_active")?,
        created_at: utc_col(row, "created_at")?,
    })
}

impl Database {
    /// Insert a new staff user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the email is taken
    pub async fn create_user(&self, user: &StaffUser) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO staff_users (id, email, password_hash, display_name, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(fmt_utc(user.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Find a staff user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<StaffUser>> {
        let row = sqlx::query("SELECT * FROM staff_users WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Find a staff user by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<StaffUser>> {
        let row = sqlx::query("SELECT * FROM staff_users WHERE email = ?1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// List staff users, admins first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_users(&self) -> AppResult<Vec<StaffUser>> {
        let rows = sqlx::query("SELECT * FROM staff_users ORDER BY role, display_name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    /// Replace a user's password hash and re-activate the account
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when no user has that id
    pub async fn reset_user_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE staff_users SET password_hash = ?1, is_active = 1 WHERE id = ?2")
                .bind(password_hash)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Staff user"));
        }
        Ok(())
    }

    /// Count active admins
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_admins(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM staff_users WHERE role = 'admin' AND is_active = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_lookup_is_case_insensitive() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user = StaffUser::new(
            "Groomer@Example.com",
            "hash".to_owned(),
            "Gina".to_owned(),
            UserRole::Groomer,
        );
        db.create_user(&user).await.unwrap();

        let found = db.get_user_by_email("GROOMER@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let duplicate = StaffUser::new(
            "groomer@example.com",
            "hash".to_owned(),
            "Other".to_owned(),
            UserRole::Admin,
        );
        let err = db.create_user(&duplicate).await.unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ResourceAlreadyExists);
        assert_eq!(db.count_admins().await.unwrap(), 0);
    }
}
