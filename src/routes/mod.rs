// ABOUTME: Route module organization for the salon HTTP API
// ABOUTME: Public booking, staff sign-in, staff back-office and admin-only groups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! HTTP routes
//!
//! Each module exposes a `XRoutes::routes(resources)` constructor returning a
//! router with its state already applied, so the server only merges them.
//! Staff groups carry their own guard layer.

/// Admin-only catalog, campaign, settings, user and job routes
pub mod admin;
/// Staff appointment routes
pub mod appointments;
/// Staff sign-in routes
pub mod auth;
/// Staff customer and pet routes
pub mod customers;
/// Health check and readiness routes
pub mod health;
/// Notification log routes
pub mod notifications;
/// Public booking routes
pub mod public;
/// Report card routes
pub mod report_cards;
/// Staff waitlist routes
pub mod waitlist;

pub use admin::AdminRoutes;
pub use appointments::AppointmentRoutes;
pub use auth::AuthRoutes;
pub use customers::CustomerRoutes;
pub use health::HealthRoutes;
pub use notifications::NotificationRoutes;
pub use public::PublicRoutes;
pub use report_cards::ReportCardRoutes;
pub use waitlist::WaitlistRoutes;
