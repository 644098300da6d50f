// ABOUTME: Unified error handling with standard error codes and HTTP response mapping
// ABOUTME: Defines ErrorCode, AppError and the JSON error envelope returned by every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the salon back-office returns [`AppResult`]. Route
//! handlers return `AppError` directly; it renders itself as a JSON envelope
//! carrying the stable code, a developer-facing message and the customer-facing
//! string from [`ErrorCode::user_message`].

mod messages;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    /// No credentials were supplied
    AuthRequired = 1000,
    /// Credentials were supplied but rejected
    AuthInvalid = 1001,
    /// Token is past its expiry
    AuthExpired = 1002,
    /// Authenticated user lacks the required role
    PermissionDenied = 1004,

    // Rate Limiting (2000-2999)
    /// Too many requests
    RateLimitExceeded = 2000,

    // Validation (3000-3999)
    /// Generic invalid input
    InvalidInput = 3000,
    /// Required field is absent
    MissingRequiredField = 3001,
    /// Field is present but badly formatted
    InvalidFormat = 3002,
    /// Numeric or date value out of the accepted range
    ValueOutOfRange = 3003,

    // Resource Management (4000-4499)
    /// Record does not exist
    ResourceNotFound = 4000,
    /// Record with the same identity already exists
    ResourceAlreadyExists = 4001,
    /// Record is in a state that forbids the change
    ResourceLocked = 4002,

    // Booking rules (4500-4999)
    /// The requested time slot cannot be booked
    SlotUnavailable = 4500,
    /// Booking wizard has unmet requirements
    BookingIncomplete = 4501,
    /// Status change not present in the transition table
    InvalidStatusTransition = 4502,
    /// Status change requires explicit confirmation
    ConfirmationRequired = 4503,
    /// Waitlist offer deadline has passed
    OfferExpired = 4504,
    /// Waitlist offer was already answered or withdrawn
    OfferClosed = 4505,
    /// Customer has no reachable channel for the message
    RecipientUnreachable = 4506,

    // External Services (5000-5999)
    /// SMS/email provider returned an error
    ExternalServiceError = 5000,
    /// SMS/email provider could not be reached
    ExternalServiceUnavailable = 5001,

    // Configuration (6000-6999)
    /// Generic configuration error
    ConfigError = 6000,
    /// Required configuration missing
    ConfigMissing = 6001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Database operation failed
    DatabaseError = 9001,
    /// JSON (de)serialization failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange
            | Self::BookingIncomplete => 400,

            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired => 401,

            Self::PermissionDenied => 403,

            Self::ResourceNotFound => 404,

            Self::ResourceAlreadyExists
            | Self::ResourceLocked
            | Self::SlotUnavailable
            | Self::OfferClosed => 409,

            Self::OfferExpired => 410,

            Self::InvalidStatusTransition
            | Self::ConfirmationRequired
            | Self::RecipientUnreachable => 422,

            Self::RateLimitExceeded => 429,

            Self::ExternalServiceError | Self::ExternalServiceUnavailable => 502,

            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError
            | Self::ConfigMissing => 500,
        }
    }

    /// Get a developer-facing description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ResourceLocked => "The resource cannot be modified in its current state",
            Self::SlotUnavailable => "The requested time slot is not available",
            Self::BookingIncomplete => "The booking is missing required information",
            Self::InvalidStatusTransition => "The appointment status change is not allowed",
            Self::ConfirmationRequired => "The status change must be explicitly confirmed",
            Self::OfferExpired => "The waitlist offer has expired",
            Self::OfferClosed => "The waitlist offer is no longer open",
            Self::RecipientUnreachable => "The customer cannot be reached on any channel",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the error is the server's fault (message must not reach clients)
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.http_status() >= 500
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Developer-facing error message
    pub message: String,
    /// Structured details (field errors, limits, identifiers)
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authentication expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Authentication token has expired")
    }

    /// Role check failed
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Resource already exists
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceAlreadyExists,
            format!("{} already exists", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Record state forbids the change
    pub fn locked(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceLocked, message)
    }

    /// Requested slot cannot be booked
    pub fn slot_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SlotUnavailable, message)
    }

    /// Status change missing from the transition table
    pub fn invalid_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot change appointment status from {from} to {to}"),
        )
        .with_details(serde_json::json!({
            "from": from.to_string(),
            "to": to.to_string(),
        }))
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error body
    pub error: ErrorResponseDetails,
}

/// Body of the error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Developer-facing message (generic for internal errors)
    pub message: String,
    /// Customer-facing message
    pub user_message: String,
    /// Structured details
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let message = if error.code.is_internal() {
            error.code.description().to_owned()
        } else {
            error.message
        };
        let details = if error.code.is_internal() {
            serde_json::Value::Null
        } else {
            error.details
        };
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message,
                user_message: error.code.user_message().to_owned(),
                details,
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON serialization failed: {error}"),
        )
        .with_source(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let root = error.root_cause().to_string();
        Self::internal(error.to_string()).with_details(serde_json::json!({ "source": root }))
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::new(ErrorCode::ResourceAlreadyExists, db.message().to_owned())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::invalid_input(format!("Referenced record does not exist: {}", db.message()))
            }
            _ => Self::database(error.to_string()).with_source(error),
        }
    }
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_connect() || error.is_timeout() {
            ErrorCode::ExternalServiceUnavailable
        } else {
            ErrorCode::ExternalServiceError
        };
        Self::new(code, format!("HTTP request failed: {error}")).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        if self.code.is_internal() {
            tracing::error!(code = ?self.code, error = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, error = %self.message, "Request rejected");
        }
        let body = ErrorResponse::from(self);
        (status, axum::Json(body)).into_response()
    }
}
