// ABOUTME: Staff routes over the notification log: filtered listing and manual retry of failed sends
// ABOUTME: Retries reuse the stored recipient and body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::database::NotificationLogFilter;
use crate::errors::AppResult;
use crate::middleware::staff_only;
use crate::models::NotificationLog;
use crate::resources::ServerResources;
use crate::validation::parse_uuid;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;

/// Notification log routes implementation
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create the notification log routes behind the staff guard
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/notifications", get(Self::handle_list))
            .route("/api/admin/notifications/:id/retry", post(Self::handle_retry))
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(filter): Query<NotificationLogFilter>,
    ) -> AppResult<Json<Vec<NotificationLog>>> {
        Ok(Json(
            resources.database.list_notification_logs(&filter).await?,
        ))
    }

    async fn handle_retry(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<NotificationLog>> {
        let id = parse_uuid("id", &id)?;
        Ok(Json(resources.notifications.retry(id).await?))
    }
}
