// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven startup configuration; staff-editable settings live in the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, DatabaseUrl, Environment, JobsConfig, LogLevel,
    NotificationConfig, ServerConfig,
};
