// ABOUTME: Request span construction for the HTTP trace layer
// ABOUTME: Every request span carries the request id so log lines can be correlated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use axum::http::Request;
use tracing::Span;

/// Header carrying the request id in and out
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one HTTP request, used as the trace layer's `make_span_with`
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
        role = tracing::field::Empty,
    )
}

/// Attach the authenticated user to the current request span
pub fn record_user(user_id: &str, role: &str) {
    Span::current()
        .record("user_id", user_id)
        .record("role", role);
}
