// ABOUTME: Request authentication from a Bearer header or the auth_token cookie
// ABOUTME: Resolves the token to an active staff user and injects it into request extensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::tracing::record_user;
use crate::auth::{AuthManager, AuthResult};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::validation::parse_uuid;
use axum::http::{header, HeaderMap};

/// Cookie used by the staff dashboard
pub const AUTH_COOKIE: &str = crate::constants::auth::AUTH_COOKIE_NAME;

/// Value of cookie `name`, if present
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// Session token from `Authorization: Bearer` or the auth cookie
#[must_use]
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .or_else(|| get_cookie_value(headers, AUTH_COOKIE))
}

/// Resolve request credentials to an active staff user
///
/// The role comes from the database, so a demoted user loses access before
/// their token expires.
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` without credentials, `AUTH_EXPIRED` or
/// `AUTH_INVALID` for a bad token, and `AUTH_INVALID` for unknown or
/// disabled accounts
#[tracing::instrument(skip_all)]
pub async fn authenticate(
    headers: &HeaderMap,
    auth_manager: &AuthManager,
    database: &Database,
) -> AppResult<AuthResult> {
    let token = extract_token(headers).ok_or_else(AppError::auth_required)?;
    let claims = auth_manager.validate_token(&token)?;
    let user_id = parse_uuid("sub", &claims.sub)
        .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))?;

    let user = database
        .get_user(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::auth_invalid("Account is not active"))?;

    record_user(&user.id.to_string(), user.role.as_str());
    Ok(AuthResult {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=from-cookie"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_or_empty_credentials() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token="));
        assert_eq!(extract_token(&headers), None);
    }
}
