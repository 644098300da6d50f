// ABOUTME: Staff waitlist routes: listing, adding on a customer's behalf, cancelling and manual offers
// ABOUTME: Manual offers run the same matching as a cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::booking::salon_now;
use crate::database::NewWaitlistEntry;
use crate::errors::{AppError, AppResult};
use crate::middleware::staff_only;
use crate::models::{SlotOffer, WaitlistEntry, WaitlistStatus};
use crate::resources::ServerResources;
use crate::validation::parse_uuid;
use crate::waitlist::FreedSlot;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Query for `GET /api/admin/waitlist`
#[derive(Debug, Default, Deserialize)]
pub struct WaitlistQuery {
    /// Only entries in this status
    #[serde(default)]
    pub status: Option<WaitlistStatus>,
}

/// Staff waitlist routes implementation
pub struct WaitlistRoutes;

impl WaitlistRoutes {
    /// Create the waitlist routes behind the staff guard
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/waitlist",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/admin/waitlist/offer", post(Self::handle_offer_slot))
            .route("/api/admin/waitlist/:id/cancel", post(Self::handle_cancel))
            .route("/api/admin/waitlist/:id/offers", get(Self::handle_offers))
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<WaitlistQuery>,
    ) -> AppResult<Json<Vec<WaitlistEntry>>> {
        Ok(Json(
            resources.database.list_waitlist_entries(query.status).await?,
        ))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(entry): Json<NewWaitlistEntry>,
    ) -> Result<Response, AppError> {
        let entry = resources.waitlist.join(&entry).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    async fn handle_cancel(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<WaitlistEntry>> {
        let id = parse_uuid("id", &id)?;
        Ok(Json(resources.waitlist.cancel(id, salon_now()).await?))
    }

    async fn handle_offers(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<Vec<SlotOffer>>> {
        let id = parse_uuid("id", &id)?;
        resources
            .database
            .get_waitlist_entry(id)
            .await?
            .ok_or_else(|| AppError::not_found("Waitlist entry"))?;
        Ok(Json(resources.database.offers_for_entry(id).await?))
    }

    /// Offer a slot staff know is open; 204 when nobody matches
    async fn handle_offer_slot(
        State(resources): State<Arc<ServerResources>>,
        Json(slot): Json<FreedSlot>,
    ) -> Result<Response, AppError> {
        match resources.waitlist.offer_slot(&slot, salon_now()).await? {
            Some(offer) => Ok((StatusCode::CREATED, Json(offer)).into_response()),
            None => Ok(StatusCode::NO_CONTENT.into_response()),
        }
    }
}
