// ABOUTME: Core types and constants for the grooming salon back-office
// ABOUTME: Foundation crate with error handling, user-facing messages, constants and models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![deny(unsafe_code)]

//! # Salon Core
//!
//! Foundation crate providing shared types and constants for the salon
//! back-office. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and user-facing messages
//! - **constants**: Business defaults and validation limits
//! - **models**: Customers, pets, appointments, waitlist, notifications, campaigns

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and business defaults organized by domain
pub mod constants;

/// Core data models (Customer, Pet, Appointment, `WaitlistEntry`, Campaign, ...)
pub mod models;
