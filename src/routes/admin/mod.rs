// ABOUTME: Admin-only route handlers for catalog, campaigns, settings, staff accounts and job triggers
// ABOUTME: Every route in this module sits behind the admin guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Admin routes
//!
//! Handlers are thin wrappers over the database and the service layer. Each
//! concern gets its own sub-router so the guard is applied per group.

mod campaigns;
mod catalog;
mod jobs;
mod settings;
mod users;

pub use campaigns::ScheduleRequest;
pub use users::CreateUserRequest;

use crate::middleware::admin_only;
use crate::resources::ServerResources;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::sync::Arc;

/// Admin routes implementation (Axum)
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let guard = || middleware::from_fn_with_state(resources.clone(), admin_only);

        Router::new()
            .merge(Self::catalog_routes(resources.clone()).layer(guard()))
            .merge(Self::campaign_routes(resources.clone()).layer(guard()))
            .merge(Self::settings_routes(resources.clone()).layer(guard()))
            .merge(Self::user_routes(resources.clone()).layer(guard()))
            .merge(Self::job_routes(resources.clone()).layer(guard()))
    }

    /// Services and add-ons
    fn catalog_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/services",
                get(catalog::handle_list_services).post(catalog::handle_create_service),
            )
            .route(
                "/api/admin/services/:id",
                put(catalog::handle_update_service),
            )
            .route(
                "/api/admin/addons",
                get(catalog::handle_list_addons).post(catalog::handle_create_addon),
            )
            .route("/api/admin/addons/:id", put(catalog::handle_update_addon))
            .with_state(resources)
    }

    /// Marketing campaigns
    fn campaign_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/campaigns",
                get(campaigns::handle_list).post(campaigns::handle_create),
            )
            .route(
                "/api/admin/campaigns/:id",
                get(campaigns::handle_get).put(campaigns::handle_update),
            )
            .route(
                "/api/admin/campaigns/:id/preview",
                get(campaigns::handle_preview),
            )
            .route(
                "/api/admin/campaigns/:id/schedule",
                post(campaigns::handle_schedule),
            )
            .route("/api/admin/campaigns/:id/send", post(campaigns::handle_send))
            .route(
                "/api/admin/campaigns/:id/cancel",
                post(campaigns::handle_cancel),
            )
            .with_state(resources)
    }

    /// Business settings
    fn settings_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/settings",
                get(settings::handle_get_settings).put(settings::handle_update_settings),
            )
            .with_state(resources)
    }

    /// Staff accounts
    fn user_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/users",
                get(users::handle_list_users).post(users::handle_create_user),
            )
            .route(
                "/api/admin/users/:id/reset-password",
                post(users::handle_reset_password),
            )
            .with_state(resources)
    }

    /// On-demand runs of the background jobs
    fn job_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/jobs/reminders", post(jobs::handle_reminders))
            .route(
                "/api/admin/jobs/expire-offers",
                post(jobs::handle_expire_offers),
            )
            .route("/api/admin/jobs/campaigns", post(jobs::handle_campaigns))
            .with_state(resources)
    }
}
