// ABOUTME: Staff authentication with HS256 JWT session tokens and bcrypt password hashes
// ABOUTME: Issues tokens at login and validates them for the back-office routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Authentication
//!
//! Customers book without an account. Groomers and admins sign in with email
//! and password and receive a signed token carrying their role, which the
//! route guards check on every back-office request.

use crate::config::AuthConfig;
use crate::constants::auth::JWT_AUDIENCE;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{StaffUser, UserRole};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `JWT` claims for a staff session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Role at the time of login
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// An authenticated staff member
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Login email
    pub email: String,
    /// Current role
    pub role: UserRole,
}

/// A successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    /// Signed session token
    pub token: String,
    /// When the token stops working
    pub expires_at: DateTime<Utc>,
    /// The signed-in user
    pub user: StaffUser,
}

/// Token issuing and password hashing
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a manager from the auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours: config.jwt_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Sign a session token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &StaffUser) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;
        Ok((token, expires_at))
    }

    /// Check signature, expiry and audience
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` for an expired token and `AUTH_INVALID` otherwise
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[JWT_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> AppError {
        tracing::debug!("JWT validation failed: {:?}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::auth_expired(),
            ErrorKind::InvalidSignature => {
                AppError::auth_invalid("Token signature verification failed")
            }
            ErrorKind::InvalidAudience => {
                AppError::auth_invalid("Token was not issued for this service")
            }
            _ => AppError::auth_invalid("Token is malformed"),
        }
    }

    /// Hash a password on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Compare a password with a stored hash; malformed hashes never match
    pub async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` for an unknown email, a wrong password or a
    /// disabled account, without saying which
    pub async fn login(
        &self,
        database: &Database,
        email: &str,
        password: &str,
    ) -> AppResult<LoginSession> {
        let email = email.trim().to_lowercase();
        let user = database.get_user_by_email(&email).await?;

        let Some(user) = user.filter(|u| u.is_active) else {
            AppLogger::log_auth_event(&email, "login", false);
            return Err(AppError::auth_invalid("Invalid email or password"));
        };
        if !self.verify_password(password, &user.password_hash).await {
            AppLogger::log_auth_event(&email, "login", false);
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let (token, expires_at) = self.generate_token(&user)?;
        AppLogger::log_auth_event(&email, "login", true);
        Ok(LoginSession {
            token,
            expires_at,
            user,
        })
    }
}
