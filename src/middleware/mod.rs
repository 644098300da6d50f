// ABOUTME: HTTP middleware for authentication, role guards, CORS and request tracing
// ABOUTME: Guards inject the authenticated staff user into request extensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Role guards
pub mod admin_guard;
/// Token extraction and authentication
pub mod auth;
/// CORS layer
pub mod cors;
/// Request spans
pub mod tracing;

pub use admin_guard::{admin_only, require_admin, require_staff, staff_only};
pub use auth::{authenticate, extract_token, get_cookie_value, AUTH_COOKIE};
pub use cors::setup_cors;
pub use tracing::{create_request_span, REQUEST_ID_HEADER};
