// ABOUTME: Staff sign-in routes issuing session tokens as a bearer token and an HttpOnly cookie
// ABOUTME: Also reports the signed-in user and clears the cookie on logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::auth::{AuthResult, LoginSession};
use crate::errors::{AppError, AppResult};
use crate::middleware::{staff_only, AUTH_COOKIE};
use crate::models::StaffUser;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Body for `POST /api/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the sign-in routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let signed_in = Router::new()
            .route("/api/auth/me", get(Self::handle_me))
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only));

        Router::new()
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .merge(signed_in)
            .with_state(resources)
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let session: LoginSession = resources
            .auth_manager
            .login(&resources.database, &request.email, &request.password)
            .await?;

        let max_age = resources.config.auth.jwt_expiry_hours * 3600;
        let secure = resources.config.environment.is_production();
        let cookie = session_cookie(&session.token, max_age, secure)?;

        let mut response = (StatusCode::OK, Json(session)).into_response();
        response.headers_mut().insert(header::SET_COOKIE, cookie);
        Ok(response)
    }

    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let secure = resources.config.environment.is_production();
        let cookie = session_cookie("", 0, secure)?;
        let mut response = StatusCode::NO_CONTENT.into_response();
        response.headers_mut().insert(header::SET_COOKIE, cookie);
        Ok(response)
    }

    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthResult>,
    ) -> AppResult<Json<StaffUser>> {
        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok(Json(user))
    }
}

/// `Set-Cookie` value for the session token; an empty token with max age 0
/// clears it
fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> AppResult<HeaderValue> {
    let mut cookie =
        format!("{AUTH_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie header: {e}")))
}
