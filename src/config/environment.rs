// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses database, auth, messaging provider and background job settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Environment-based configuration

use crate::constants::{auth, notifications, ports};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Default background job tick
pub const DEFAULT_JOBS_INTERVAL_SECS: u64 = 300;
/// Secret used outside production when `JWT_SECRET` is unset
const DEVELOPMENT_JWT_SECRET: &str = "salon-development-secret-change-me";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Normal operation
    #[default]
    Info,
    /// Verbose
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Live deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
            Self::Testing => f.write_str("testing"),
        }
    }
}

/// Where the database lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// File path
        path: PathBuf,
    },
    /// In-memory `SQLite` (tests, demos)
    Memory,
}

impl DatabaseUrl {
    /// Parse `sqlite:<path>`, `sqlite::memory:` or a bare path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")).unwrap_or(s);
        if path == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path),
            }
        }
    }

    /// Connection string for sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/salon.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Staff authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Twilio and Resend credentials
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Twilio account SID
    pub twilio_account_sid: Option<String>,
    /// Twilio auth token
    #[serde(skip_serializing)]
    pub twilio_auth_token: Option<String>,
    /// Sending number (E.164)
    pub twilio_from_number: Option<String>,
    /// Twilio API base URL
    pub twilio_api_base: String,
    /// Resend API key
    #[serde(skip_serializing)]
    pub resend_api_key: Option<String>,
    /// Resend API base URL
    pub resend_api_base: String,
    /// Sender address for email
    pub email_from_address: Option<String>,
    /// Public URL used in customer links (waitlist offers, booking)
    pub public_base_url: String,
}

impl NotificationConfig {
    /// Twilio is usable
    #[must_use]
    pub const fn sms_configured(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
    }

    /// Resend is usable
    #[must_use]
    pub const fn email_configured(&self) -> bool {
        self.resend_api_key.is_some() && self.email_from_address.is_some()
    }

    fn from_env() -> Self {
        Self {
            twilio_account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
            twilio_from_number: non_empty_var("TWILIO_FROM_NUMBER"),
            twilio_api_base: env_var_or("TWILIO_API_BASE", notifications::TWILIO_API_BASE),
            resend_api_key: non_empty_var("RESEND_API_KEY"),
            resend_api_base: env_var_or("RESEND_API_BASE", notifications::RESEND_API_BASE),
            email_from_address: non_empty_var("EMAIL_FROM_ADDRESS"),
            public_base_url: env_var_or("PUBLIC_BASE_URL", "http://localhost:8090")
                .trim_end_matches('/')
                .to_owned(),
        }
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_from_number", &self.twilio_from_number)
            .field("twilio_api_base", &self.twilio_api_base)
            .field("resend_api_base", &self.resend_api_base)
            .field("email_from_address", &self.email_from_address)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

/// Background job scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Run reminders, offer expiry and campaign dispatch on a timer
    pub enabled: bool,
    /// Seconds between runs
    pub interval_secs: u64,
}

/// Server configuration loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Messaging provider configuration
    pub notifications: NotificationConfig,
    /// Background jobs
    pub jobs: JobsConfig,
    /// Allowed CORS origins (`*` for any)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse, or if
    /// `JWT_SECRET` is missing in production
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                bail!("JWT_SECRET must be set when ENVIRONMENT=production")
            }
            None => {
                warn!("JWT_SECRET not set; using the development secret");
                DEVELOPMENT_JWT_SECRET.to_owned()
            }
        };

        let config = Self {
            environment,
            http_port: env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", "sqlite:./data/salon.db")),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &auth::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
                bcrypt_cost: env_var_or("BCRYPT_COST", &DEFAULT_BCRYPT_COST.to_string())
                    .parse()
                    .context("Invalid BCRYPT_COST value")?,
            },
            notifications: NotificationConfig::from_env(),
            jobs: JobsConfig {
                enabled: env_var_or("JOBS_ENABLED", "true")
                    .parse()
                    .context("Invalid JOBS_ENABLED value")?,
                interval_secs: env_var_or(
                    "JOBS_INTERVAL_SECS",
                    &DEFAULT_JOBS_INTERVAL_SECS.to_string(),
                )
                .parse()
                .context("Invalid JOBS_INTERVAL_SECS value")?,
            },
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
        };

        if config.jobs.interval_secs == 0 {
            bail!("JOBS_INTERVAL_SECS must be greater than zero");
        }

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration suitable for tests: in-memory database, mock providers, no jobs
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            environment: Environment::Testing,
            http_port: 0,
            log_level: LogLevel::Warn,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-with-enough-entropy-0123456789".to_owned(),
                jwt_expiry_hours: auth::DEFAULT_JWT_EXPIRY_HOURS,
                bcrypt_cost: 4,
            },
            notifications: NotificationConfig {
                twilio_api_base: notifications::TWILIO_API_BASE.to_owned(),
                resend_api_base: notifications::RESEND_API_BASE.to_owned(),
                public_base_url: "http://localhost:8090".to_owned(),
                ..NotificationConfig::default()
            },
            jobs: JobsConfig {
                enabled: false,
                interval_secs: DEFAULT_JOBS_INTERVAL_SECS,
            },
            cors_origins: vec!["*".to_owned()],
        }
    }

    /// One-line summary for the startup log; never includes secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} http_port={} log_level={} database={} sms={} email={} jobs={} cors={}",
            self.environment,
            self.http_port,
            self.log_level,
            if self.database.url.is_memory() {
                "memory".to_owned()
            } else {
                self.database.url.to_string()
            },
            if self.notifications.sms_configured() {
                "twilio"
            } else {
                "mock"
            },
            if self.notifications.email_configured() {
                "resend"
            } else {
                "mock"
            },
            if self.jobs.enabled {
                format!("every {}s", self.jobs.interval_secs)
            } else {
                "disabled".to_owned()
            },
            self.cors_origins.join(",")
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/salon.db").to_connection_string(),
            "sqlite:./data/salon.db"
        );
        assert_eq!(
            DatabaseUrl::parse_url("/var/lib/salon.db").to_connection_string(),
            "sqlite:/var/lib/salon.db"
        );
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_summary_hides_secrets() {
        let mut config = ServerConfig::for_testing();
        config.notifications.resend_api_key = Some("re_secret".to_owned());
        let summary = config.summary();
        assert!(!summary.contains("re_secret"));
        assert!(!summary.contains(&config.auth.jwt_secret));
        assert!(summary.contains("database=memory"));
    }
}
