// ABOUTME: Main library entry point for the grooming salon back-office server
// ABOUTME: Booking wizard, availability, appointments, waitlist offers, notifications and campaigns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Salon Server
//!
//! Back-office API for a pet grooming salon. Customers book online through a
//! step-by-step wizard; staff run the day's schedule, manage customers and
//! pets, work the waitlist and send marketing campaigns.
//!
//! ## Features
//!
//! - **Booking wizard**: per-mode step tables with server-side gates
//! - **Availability**: slots from business hours, capacity, buffers and lead time
//! - **Appointment lifecycle**: a fixed transition table with confirmations
//! - **Waitlist**: freed slots are offered to the best match with a deadline
//! - **Notifications**: SMS through Twilio and email through Resend, fully logged
//! - **Campaigns**: audience segments limited to customers who opted in
//!
//! ## Architecture
//!
//! - **Models / errors / constants**: the `salon-core` workspace crate
//! - **Database**: `sqlx` over `SQLite`, one module per entity
//! - **Services**: booking, appointments, waitlist, campaigns, report cards
//! - **Routes**: axum route groups guarded by role middleware
//! - **Scheduler**: reminders, offer expiry and scheduled campaigns
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use salon_server::config::ServerConfig;
//! use salon_server::database::Database;
//! use salon_server::resources::ServerResources;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database.url.to_connection_string()).await?;
//!     let port = config.http_port;
//!     let resources = Arc::new(ServerResources::new(database, config));
//!     salon_server::server::run(resources, port).await?;
//!     Ok(())
//! }
//! ```

/// Appointment status transitions and rescheduling
pub mod appointments;

/// Staff authentication
pub mod auth;

/// Booking wizard, pricing, availability and submission
pub mod booking;

/// Marketing campaigns and audience segments
pub mod campaigns;

/// Environment configuration
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// `SQLite` storage
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Phone, money and time formatting
pub mod formatters;

/// Production logging with structured output
pub mod logging;

/// HTTP middleware for authentication, guards, CORS and tracing
pub mod middleware;

/// Domain models
pub mod models;

/// Message templates, providers and the logged delivery service
pub mod notifications;

/// Post-visit report cards
pub mod report_cards;

/// Shared service container
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Periodic background jobs
pub mod scheduler;

/// Router assembly and serving
pub mod server;

/// Input validation
pub mod validation;

/// Waitlist matching and slot offers
pub mod waitlist;
