// ABOUTME: Logging configuration and structured logging setup for the salon server
// ABOUTME: Configures level, output format and noise filters; AppLogger emits structured business events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Structured logging with `tracing`

use crate::constants::service_names;
use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, production, testing)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: service_names::SALON_SERVER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::SALON_SERVER.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(&self.level),
            |directive| EnvFilter::new(&directive),
        );

        // Noise reduction applies whatever RUST_LOG says
        [
            "hyper=warn",
            "hyper::proto=warn",
            "reqwest=warn",
            "sqlx=warn",
            "sqlx::query=warn",
            "tower_http=info",
        ]
        .into_iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
        .add_directive(
            format!("salon_server={}", self.level)
                .parse()
                .unwrap_or_else(|_| tracing::Level::INFO.into()),
        )
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE);
                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Salon server starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "spans": self.include_spans
            }
        });
        info!("Logging configured: {}", config_summary);
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured business events
pub struct AppLogger;

impl AppLogger {
    /// Staff authentication attempt
    pub fn log_auth_event(email: &str, event: &str, success: bool) {
        if success {
            info!(auth.email = %email, auth.event = %event, auth.success = true, "Authentication event");
        } else {
            warn!(auth.email = %email, auth.event = %event, auth.success = false, "Authentication event");
        }
    }

    /// Appointment stored
    pub fn log_booking_created(appointment_id: &str, source: &str, scheduled_at: &str) {
        info!(
            appointment.id = %appointment_id,
            booking.source = %source,
            appointment.scheduled_at = %scheduled_at,
            "Booking created"
        );
    }

    /// Appointment moved along the status table
    pub fn log_status_change(appointment_id: &str, from: &str, to: &str, actor: Option<&str>) {
        info!(
            appointment.id = %appointment_id,
            status.from = %from,
            status.to = %to,
            actor = actor.unwrap_or("system"),
            "Appointment status changed"
        );
    }

    /// Provider accepted a message
    pub fn log_notification_sent(log_id: &str, channel: &str, kind: &str, attempts: u32) {
        info!(
            notification.id = %log_id,
            notification.channel = %channel,
            notification.kind = %kind,
            notification.attempts = attempts,
            "Notification sent"
        );
    }

    /// Provider rejected a message or was unreachable
    pub fn log_notification_failed(log_id: &str, channel: &str, kind: &str, error: &str) {
        warn!(
            notification.id = %log_id,
            notification.channel = %channel,
            notification.kind = %kind,
            notification.error = %error,
            "Notification failed"
        );
    }

    /// Waitlist offer issued for a freed slot
    pub fn log_offer_issued(offer_id: &str, entry_id: &str, slot_start: &str, attempt: u32) {
        info!(
            offer.id = %offer_id,
            waitlist.entry_id = %entry_id,
            offer.slot_start = %slot_start,
            waitlist.attempt = attempt,
            "Waitlist offer issued"
        );
    }

    /// Campaign dispatch finished
    pub fn log_campaign_dispatched(campaign_id: &str, sent: u32, failed: u32, skipped: u32) {
        info!(
            campaign.id = %campaign_id,
            campaign.sent = sent,
            campaign.failed = failed,
            campaign.skipped = skipped,
            "Campaign dispatched"
        );
    }

    /// Background job run summary
    pub fn log_job_run(job: &str, processed: usize, duration_ms: u64) {
        info!(
            job.name = %job,
            job.processed = processed,
            job.duration_ms = duration_ms,
            "Background job finished"
        );
    }
}
