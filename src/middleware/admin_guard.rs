// ABOUTME: Role guards for the back-office routes
// ABOUTME: Staff routes admit groomers and admins; admin routes admit admins only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Role guards
//!
//! Route groups are wrapped with [`staff_only`] or [`admin_only`] through
//! `axum::middleware::from_fn_with_state`. Both authenticate the request and
//! insert the [`AuthResult`] as a request extension for handlers to read.

use super::auth::authenticate;
use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Groomer or admin
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for other roles
pub fn require_staff(auth: &AuthResult) -> AppResult<()> {
    if auth.role.is_staff() {
        Ok(())
    } else {
        Err(AppError::permission_denied("Staff access required"))
    }
}

/// Admin only
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for other roles
pub fn require_admin(auth: &AuthResult) -> AppResult<()> {
    if auth.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::permission_denied("Admin privileges required"))
    }
}

async fn guard(
    resources: &ServerResources,
    mut request: Request,
    next: Next,
    check: fn(&AuthResult) -> AppResult<()>,
) -> Response {
    let auth = match authenticate(
        request.headers(),
        &resources.auth_manager,
        &resources.database,
    )
    .await
    .and_then(|auth| check(&auth).map(|()| auth))
    {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Middleware admitting groomers and admins
pub async fn staff_only(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&resources, request, next, require_staff).await
}

/// Middleware admitting admins
pub async fn admin_only(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&resources, request, next, require_admin).await
}
