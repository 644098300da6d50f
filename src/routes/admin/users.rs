// ABOUTME: Admin staff account handlers: listing, creating groomers or admins, and password resets
// ABOUTME: Passwords are bcrypt-hashed before they reach the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::auth::AuthResult;
use crate::constants::limits::MAX_NAME_LENGTH;
use crate::errors::{AppError, AppResult};
use crate::models::{StaffUser, UserRole};
use crate::resources::ServerResources;
use crate::validation::{is_valid_email, parse_uuid, ValidationErrors};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Body for `POST /api/admin/users`
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Login email
    pub email: String,
    /// Initial password
    pub password: String,
    /// Name on the schedule
    pub display_name: String,
    /// Groomer or admin
    pub role: UserRole,
}

/// Body for `POST /api/admin/users/:id/reset-password`
#[derive(Debug, Deserialize)]
pub(super) struct ResetPasswordRequest {
    password: String,
}

fn check_new_user(request: &CreateUserRequest) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    errors.check(
        is_valid_email(request.email.trim()),
        "email",
        "must be a valid email address",
    );
    errors.text("display_name", &request.display_name, MAX_NAME_LENGTH);
    errors.check(
        request.password.chars().count() >= MIN_PASSWORD_LENGTH,
        "password",
        "must be at least 8 characters",
    );
    errors.check(
        request.role.is_staff(),
        "role",
        "must be groomer or admin",
    );
    errors.into_result()
}

pub(super) async fn handle_list_users(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Vec<StaffUser>>> {
    Ok(Json(resources.database.list_users().await?))
}

pub(super) async fn handle_create_user(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, AppError> {
    check_new_user(&request)?;
    let hash = resources.auth_manager.hash_password(&request.password).await?;
    let user = StaffUser::new(
        &request.email,
        hash,
        request.display_name.trim().to_owned(),
        request.role,
    );
    resources.database.create_user(&user).await?;
    info!(user.id = %user.id, role = %user.role, actor = %auth.email, "Staff user created");
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub(super) async fn handle_reset_password(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    let id = parse_uuid("id", &id)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(
            "password must be at least 8 characters",
        ));
    }
    let hash = resources.auth_manager.hash_password(&request.password).await?;
    resources.database.reset_user_password(id, &hash).await?;
    info!(user.id = %id, actor = %auth.email, "Staff password reset");
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: UserRole, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: "groomer@salon.test".to_owned(),
            password: password.to_owned(),
            display_name: "Sam".to_owned(),
            role,
        }
    }

    #[test]
    fn test_new_user_checks() {
        assert!(check_new_user(&request(UserRole::Groomer, "long enough")).is_ok());
        assert!(check_new_user(&request(UserRole::Admin, "short")).is_err());
        assert!(check_new_user(&request(UserRole::Customer, "long enough")).is_err());
    }
}
