// ABOUTME: Admin campaign handlers: drafts, audience preview, scheduling, sending and cancelling
// ABOUTME: Times in requests are salon-local
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::booking::salon_now;
use crate::campaigns::{AudiencePreview, DispatchReport};
use crate::database::{CampaignUpdate, NewCampaign};
use crate::errors::{AppError, AppResult};
use crate::models::Campaign;
use crate::resources::ServerResources;
use crate::validation::parse_uuid;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::sync::Arc;

/// Body for `POST /api/admin/campaigns/:id/schedule`
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    /// Salon-local send time
    pub scheduled_for: NaiveDateTime,
}

pub(super) async fn handle_list(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Vec<Campaign>>> {
    Ok(Json(resources.database.list_campaigns().await?))
}

pub(super) async fn handle_create(
    State(resources): State<Arc<ServerResources>>,
    Json(new): Json<NewCampaign>,
) -> Result<Response, AppError> {
    let campaign = resources.campaigns.create(&new).await?;
    Ok((StatusCode::CREATED, Json(campaign)).into_response())
}

pub(super) async fn handle_get(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<Json<Campaign>> {
    let id = parse_uuid("id", &id)?;
    let campaign = resources
        .database
        .get_campaign(id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;
    Ok(Json(campaign))
}

pub(super) async fn handle_update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(update): Json<CampaignUpdate>,
) -> AppResult<Json<Campaign>> {
    let id = parse_uuid("id", &id)?;
    Ok(Json(resources.campaigns.update(id, &update).await?))
}

pub(super) async fn handle_preview(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<Json<AudiencePreview>> {
    let id = parse_uuid("id", &id)?;
    Ok(Json(
        resources.campaigns.preview_audience(id, salon_now()).await?,
    ))
}

pub(super) async fn handle_schedule(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(request): Json<ScheduleRequest>,
) -> AppResult<Json<Campaign>> {
    let id = parse_uuid("id", &id)?;
    let campaign = resources
        .campaigns
        .schedule(id, request.scheduled_for, salon_now())
        .await?;
    Ok(Json(campaign))
}

pub(super) async fn handle_send(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<Json<DispatchReport>> {
    let id = parse_uuid("id", &id)?;
    Ok(Json(resources.campaigns.send(id, salon_now()).await?))
}

pub(super) async fn handle_cancel(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<Json<Campaign>> {
    let id = parse_uuid("id", &id)?;
    Ok(Json(resources.campaigns.cancel(id).await?))
}
