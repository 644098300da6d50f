// ABOUTME: Admin triggers that run one background job immediately
// ABOUTME: Useful when the interval runner is disabled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::booking::salon_now;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::scheduler;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub(super) async fn handle_reminders(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Value>> {
    let sent = scheduler::send_due_reminders(&resources, salon_now()).await?;
    Ok(Json(json!({ "job": "reminders", "processed": sent })))
}

pub(super) async fn handle_expire_offers(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Value>> {
    let expired = scheduler::expire_offers(&resources, salon_now()).await?;
    Ok(Json(json!({ "job": "expire_offers", "processed": expired })))
}

pub(super) async fn handle_campaigns(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<Value>> {
    let dispatched = scheduler::dispatch_campaigns(&resources, salon_now()).await?;
    Ok(Json(json!({ "job": "campaigns", "processed": dispatched })))
}
