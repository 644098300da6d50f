// ABOUTME: Admin business settings handlers
// ABOUTME: The whole settings document is replaced and validated on write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::auth::AuthResult;
use crate::errors::AppResult;
use crate::models::BusinessSettings;
use crate::resources::ServerResources;
use crate::validation::Validate;
use axum::extract::State;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::info;

pub(super) async fn handle_get_settings(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<BusinessSettings>> {
    Ok(Json(resources.database.load_business_settings().await?))
}

pub(super) async fn handle_update_settings(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Json(settings): Json<BusinessSettings>,
) -> AppResult<Json<BusinessSettings>> {
    settings.validate()?;
    resources.database.save_business_settings(&settings).await?;
    info!(actor = %auth.email, "Business settings updated");
    Ok(Json(resources.database.load_business_settings().await?))
}
