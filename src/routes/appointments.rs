// ABOUTME: Staff appointment routes: schedule listing, status changes, rescheduling and staff bookings
// ABOUTME: All routes require a groomer or admin session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::appointments::{transitions_from, StatusChangeRequest, Transition};
use crate::auth::AuthResult;
use crate::booking::{salon_now, BookingDraft, BookingMode};
use crate::database::AppointmentFilter;
use crate::errors::{AppError, AppResult};
use crate::middleware::staff_only;
use crate::models::{Appointment, AppointmentStatus};
use crate::resources::ServerResources;
use crate::validation::parse_uuid;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Body for `POST /api/admin/appointments/:id/status`
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// Target status
    pub status: AppointmentStatus,
    /// Acknowledges a destructive change
    #[serde(default)]
    pub confirmed: bool,
    /// Cancellation reason
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body for `POST /api/admin/appointments/:id/reschedule`
#[derive(Debug, Deserialize)]
pub struct RescheduleBody {
    /// New salon-local start
    pub scheduled_at: NaiveDateTime,
}

/// Body for `POST /api/admin/bookings`
#[derive(Debug, Deserialize)]
pub struct StaffBookingBody {
    /// Admin or walk-in draft
    pub draft: BookingDraft,
    /// Groomer to assign
    #[serde(default)]
    pub groomer_id: Option<Uuid>,
}

/// Appointment with the actions staff may take next
#[derive(Debug, Serialize)]
pub struct AppointmentDetail {
    /// The appointment
    pub appointment: Appointment,
    /// Allowed status changes
    pub transitions: Vec<Transition>,
}

/// Staff appointment routes implementation
pub struct AppointmentRoutes;

impl AppointmentRoutes {
    /// Create the appointment routes behind the staff guard
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/appointments", get(Self::handle_list))
            .route("/api/admin/appointments/:id", get(Self::handle_get))
            .route(
                "/api/admin/appointments/:id/transitions",
                get(Self::handle_transitions),
            )
            .route(
                "/api/admin/appointments/:id/status",
                post(Self::handle_change_status),
            )
            .route(
                "/api/admin/appointments/:id/reschedule",
                post(Self::handle_reschedule),
            )
            .route("/api/admin/bookings", post(Self::handle_staff_booking))
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only))
            .with_state(resources)
    }

    async fn load(resources: &ServerResources, id: &str) -> AppResult<Appointment> {
        let id = parse_uuid("id", id)?;
        resources
            .database
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(filter): Query<AppointmentFilter>,
    ) -> AppResult<Json<Vec<Appointment>>> {
        Ok(Json(resources.database.list_appointments(&filter).await?))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<AppointmentDetail>> {
        let appointment = Self::load(&resources, &id).await?;
        let transitions = transitions_from(appointment.status).copied().collect();
        Ok(Json(AppointmentDetail {
            appointment,
            transitions,
        }))
    }

    async fn handle_transitions(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<Vec<Transition>>> {
        let appointment = Self::load(&resources, &id).await?;
        Ok(Json(transitions_from(appointment.status).copied().collect()))
    }

    async fn handle_change_status(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthResult>,
        Path(id): Path<String>,
        Json(body): Json<StatusBody>,
    ) -> Result<Response, AppError> {
        let id = parse_uuid("id", &id)?;
        let request = StatusChangeRequest {
            to: body.status,
            confirmed: body.confirmed,
            reason: body.reason.as_deref(),
            actor: Some(&auth.email),
        };
        let change = resources
            .appointments
            .change_status(id, request, salon_now())
            .await?;
        Ok((StatusCode::OK, Json(change)).into_response())
    }

    async fn handle_reschedule(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<RescheduleBody>,
    ) -> Result<Response, AppError> {
        let id = parse_uuid("id", &id)?;
        let moved = resources
            .appointments
            .reschedule(id, body.scheduled_at, salon_now())
            .await?;
        Ok((StatusCode::OK, Json(moved)).into_response())
    }

    async fn handle_staff_booking(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<StaffBookingBody>,
    ) -> Result<Response, AppError> {
        if body.draft.mode == BookingMode::Customer {
            return Err(AppError::invalid_input(
                "Staff bookings use the admin or walk_in mode",
            ));
        }
        let outcome = resources
            .bookings
            .submit(&body.draft, body.groomer_id, salon_now())
            .await?;
        Ok((StatusCode::CREATED, Json(outcome)).into_response())
    }
}
