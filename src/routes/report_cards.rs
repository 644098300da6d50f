// ABOUTME: Staff report card routes: write a card after a completed visit and send it to the owner
// ABOUTME: Cards are also reachable through their appointment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::database::NewReportCard;
use crate::errors::{AppError, AppResult};
use crate::middleware::staff_only;
use crate::models::ReportCard;
use crate::report_cards::ReportCardDelivery;
use crate::resources::ServerResources;
use crate::validation::parse_uuid;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;

/// Report card routes implementation
pub struct ReportCardRoutes;

impl ReportCardRoutes {
    /// Create the report card routes behind the staff guard
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/report-cards", post(Self::handle_create))
            .route("/api/admin/report-cards/:id", get(Self::handle_get))
            .route("/api/admin/report-cards/:id/send", post(Self::handle_send))
            .route(
                "/api/admin/appointments/:id/report-card",
                get(Self::handle_for_appointment),
            )
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only))
            .with_state(resources)
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(card): Json<NewReportCard>,
    ) -> Result<Response, AppError> {
        let card = resources.report_cards.create(&card).await?;
        Ok((StatusCode::CREATED, Json(card)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<ReportCard>> {
        let id = parse_uuid("id", &id)?;
        let card = resources
            .database
            .get_report_card(id)
            .await?
            .ok_or_else(|| AppError::not_found("Report card"))?;
        Ok(Json(card))
    }

    async fn handle_send(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<ReportCardDelivery>> {
        let id = parse_uuid("id", &id)?;
        Ok(Json(resources.report_cards.send(id).await?))
    }

    async fn handle_for_appointment(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<ReportCard>> {
        let id = parse_uuid("id", &id)?;
        let card = resources
            .database
            .report_card_for_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Report card"))?;
        Ok(Json(card))
    }
}
