// ABOUTME: Public booking routes: catalog, availability, wizard gates, bookings and the waitlist
// ABOUTME: No login; waitlist offer responses are authorized by the token sent to the customer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Routes used by the customer-facing booking flow.
//!
//! The wizard is evaluated server-side through `POST /api/booking/steps` so the
//! web client and the final submission share the same gates.

use crate::booking::wizard::{
    can_proceed, furthest_reachable_step, missing_requirements, next_step, step_at, steps,
};
use crate::booking::{
    available_slots, quote, salon_now, BookingDraft, BookingMode, BookingReceipt, BookingStep,
    Slot,
};
use crate::database::NewWaitlistEntry;
use crate::errors::{AppError, AppResult};
use crate::models::{Addon, GroomingService, PetSize};
use crate::resources::ServerResources;
use crate::validation::{parse_uuid, FieldError};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Active catalog
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Bookable services
    pub services: Vec<GroomingService>,
    /// Bookable add-ons
    pub addons: Vec<Addon>,
}

/// Query for `GET /api/availability`
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Salon-local day
    pub date: NaiveDate,
    /// Service to fit
    pub service_id: String,
    /// Comma-separated add-on ids
    #[serde(default)]
    pub addon_ids: Option<String>,
}

/// Open slots for one day
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Requested day
    pub date: NaiveDate,
    /// Length used for the search
    pub duration_minutes: u32,
    /// Bookable start times
    pub slots: Vec<Slot>,
}

/// Body for `POST /api/booking/steps`
#[derive(Debug, Deserialize)]
pub struct StepRequest {
    /// Draft collected so far
    pub draft: BookingDraft,
    /// Step the user is on
    #[serde(default)]
    pub step_index: usize,
}

/// Gate evaluation for the current step
#[derive(Debug, Serialize)]
pub struct StepResponse {
    /// Step table for the draft's mode
    pub steps: &'static [BookingStep],
    /// Step at `step_index`
    pub current_step: Option<BookingStep>,
    /// Whether the user may continue
    pub can_proceed: bool,
    /// What still blocks continuing
    pub missing: Vec<FieldError>,
    /// Where "next" leads
    pub next_step_index: usize,
    /// Highest step the user may jump to
    pub furthest_reachable_step: usize,
}

/// Body for `POST /api/waitlist/offers/:id/respond`
#[derive(Debug, Deserialize)]
pub struct OfferReply {
    /// Token from the offer message
    pub token: String,
    /// Take the slot or pass
    pub accept: bool,
}

/// Public routes implementation
pub struct PublicRoutes;

impl PublicRoutes {
    /// Create the public booking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/services", get(Self::handle_catalog))
            .route("/api/availability", get(Self::handle_availability))
            .route("/api/booking/steps", post(Self::handle_steps))
            .route("/api/bookings", post(Self::handle_create_booking))
            .route("/api/waitlist", post(Self::handle_join_waitlist))
            .route(
                "/api/waitlist/offers/:id/respond",
                post(Self::handle_offer_reply),
            )
            .with_state(resources)
    }

    async fn handle_catalog(
        State(resources): State<Arc<ServerResources>>,
    ) -> AppResult<Json<CatalogResponse>> {
        Ok(Json(CatalogResponse {
            services: resources.database.list_services(true).await?,
            addons: resources.database.list_addons(true).await?,
        }))
    }

    async fn handle_availability(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<AvailabilityQuery>,
    ) -> AppResult<Json<AvailabilityResponse>> {
        let service_id = parse_uuid("service_id", &query.service_id)?;
        let addon_ids = parse_id_list("addon_ids", query.addon_ids.as_deref())?;

        let database = &resources.database;
        let service = database
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        let addons = database.get_addons(&addon_ids).await?;
        // Size changes price, not duration
        let priced = quote(&service, PetSize::Medium, &addon_ids, &addons)?;

        let settings = database.load_business_settings().await?;
        let existing = database.appointments_on_date(query.date).await?;
        let slots = available_slots(
            query.date,
            &settings,
            priced.duration_minutes,
            &existing,
            salon_now(),
        );

        Ok(Json(AvailabilityResponse {
            date: query.date,
            duration_minutes: priced.duration_minutes,
            slots,
        }))
    }

    async fn handle_steps(Json(request): Json<StepRequest>) -> Json<StepResponse> {
        let draft = &request.draft;
        let index = request.step_index;
        let missing = missing_requirements(draft, index);
        Json(StepResponse {
            steps: steps(draft.mode),
            current_step: step_at(draft.mode, index),
            can_proceed: can_proceed(draft, index),
            missing,
            next_step_index: next_step(draft.mode, index),
            furthest_reachable_step: furthest_reachable_step(draft),
        })
    }

    async fn handle_create_booking(
        State(resources): State<Arc<ServerResources>>,
        Json(mut draft): Json<BookingDraft>,
    ) -> Result<Response, AppError> {
        draft.mode = BookingMode::Customer;
        let outcome = resources.bookings.submit(&draft, None, salon_now()).await?;
        Ok((StatusCode::CREATED, Json(BookingReceipt::from(outcome))).into_response())
    }

    async fn handle_join_waitlist(
        State(resources): State<Arc<ServerResources>>,
        Json(mut entry): Json<NewWaitlistEntry>,
    ) -> Result<Response, AppError> {
        // Only staff may queue-jump
        entry.priority = 0;
        let entry = resources.waitlist.join(&entry).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    async fn handle_offer_reply(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(reply): Json<OfferReply>,
    ) -> Result<Response, AppError> {
        let offer_id = parse_uuid("id", &id)?;
        let response = resources
            .waitlist
            .respond(offer_id, &reply.token, reply.accept, salon_now())
            .await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

/// Parse `a,b,c` into ids; blank input is an empty list
///
/// # Errors
///
/// Returns `INVALID_INPUT` naming `field` when any id is malformed
pub fn parse_id_list(field: &str, raw: Option<&str>) -> AppResult<Vec<Uuid>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_uuid(field, s))
        .collect()
}
