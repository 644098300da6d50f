// ABOUTME: HTTP server assembly: merges the route groups and applies the shared middleware stack
// ABOUTME: Serves on the configured port until Ctrl-C and runs background jobs alongside
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Server
//!
//! Layer order, outermost first: request id assignment, tracing, id
//! propagation to the response, CORS, body limit and security headers.

use crate::errors::{AppError, AppResult};
use crate::middleware::{create_request_span, setup_cors, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::{
    AdminRoutes, AppointmentRoutes, AuthRoutes, CustomerRoutes, HealthRoutes,
    NotificationRoutes, PublicRoutes, ReportCardRoutes, WaitlistRoutes,
};
use crate::scheduler::spawn_background_jobs;
use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Request};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Every route group with the middleware stack applied
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(PublicRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(AppointmentRoutes::routes(resources.clone()))
        .merge(CustomerRoutes::routes(resources.clone()))
        .merge(WaitlistRoutes::routes(resources.clone()))
        .merge(NotificationRoutes::routes(resources.clone()))
        .merge(ReportCardRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources.clone()))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(setup_cors(&resources.config.cors_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| create_request_span(request)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// Bind `port` and serve until Ctrl-C
///
/// Background jobs run on their interval when enabled and stop with the
/// server.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>, port: u16) -> AppResult<()> {
    let jobs = resources.config.jobs.enabled.then(|| {
        spawn_background_jobs(
            resources.clone(),
            Duration::from_secs(resources.config.jobs.interval_secs),
        )
    });

    let app = build_router(&resources);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "HTTP server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server failed: {e}")));

    if let Some(jobs) = jobs {
        jobs.abort();
    }
    info!("HTTP server stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutdown signal received");
}
