// ABOUTME: Admin catalog handlers for grooming services and add-ons
// ABOUTME: Listing includes inactive items; deactivation is an update with is_active false
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::database::{AddonInput, ServiceInput};
use crate::errors::{AppError, AppResult};
use crate::models::{Addon, GroomingService};
use crate::resources::ServerResources;
use crate::validation::{parse_uuid, Validate};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::info;

pub(super) async fn handle_list_services(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Vec<GroomingService>>> {
    Ok(Json(resources.database.list_services(false).await?))
}

pub(super) async fn handle_create_service(
    State(resources): State<Arc<ServerResources>>,
    Json(input): Json<ServiceInput>,
) -> Result<Response, AppError> {
    input.validate()?;
    let service = resources.database.create_service(&input).await?;
    info!(service.id = %service.id, name = %service.name, "Service created");
    Ok((StatusCode::CREATED, Json(service)).into_response())
}

pub(super) async fn handle_update_service(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(input): Json<ServiceInput>,
) -> AppResult<Json<GroomingService>> {
    let id = parse_uuid("id", &id)?;
    input.validate()?;
    Ok(Json(resources.database.update_service(id, &input).await?))
}

pub(super) async fn handle_list_addons(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Vec<Addon>>> {
    Ok(Json(resources.database.list_addons(false).await?))
}

pub(super) async fn handle_create_addon(
    State(resources): State<Arc<ServerResources>>,
    Json(input): Json<AddonInput>,
) -> Result<Response, AppError> {
    input.validate()?;
    let addon = resources.database.create_addon(&input).await?;
    info!(addon.id = %addon.id, name = %addon.name, "Add-on created");
    Ok((StatusCode::CREATED, Json(addon)).into_response())
}

pub(super) async fn handle_update_addon(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(input): Json<AddonInput>,
) -> AppResult<Json<Addon>> {
    let id = parse_uuid("id", &id)?;
    input.validate()?;
    Ok(Json(resources.database.update_addon(id, &input).await?))
}
