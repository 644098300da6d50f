// ABOUTME: Tests for loading ServerConfig from environment variables
// ABOUTME: Runs serially because the process environment is shared between tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use salon_server::config::{DatabaseUrl, Environment, LogLevel, ServerConfig};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "ENVIRONMENT",
    "JWT_SECRET",
    "HTTP_PORT",
    "RUST_LOG",
    "DATABASE_URL",
    "JWT_EXPIRY_HOURS",
    "BCRYPT_COST",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_FROM_NUMBER",
    "RESEND_API_KEY",
    "EMAIL_FROM_ADDRESS",
    "PUBLIC_BASE_URL",
    "JOBS_ENABLED",
    "JOBS_INTERVAL_SECS",
    "CORS_ORIGINS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_development_defaults() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.auth.jwt_secret.is_empty());
    assert!(config.jobs.enabled);
    assert!(config.jobs.interval_secs > 0);
    assert_eq!(config.cors_origins, vec!["*".to_owned()]);
    assert!(!config.notifications.sms_configured());
    assert!(!config.notifications.email_configured());
    assert!(config.summary().contains("sms=mock"));
}

#[test]
#[serial]
fn test_overrides_are_read() {
    clear_env();
    env::set_var("HTTP_PORT", "9100");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("RUST_LOG", "debug");
    env::set_var("PUBLIC_BASE_URL", "https://book.salon.test/");
    env::set_var("JOBS_ENABLED", "false");
    env::set_var("CORS_ORIGINS", "https://salon.test, https://admin.salon.test");
    env::set_var("TWILIO_ACCOUNT_SID", "AC123");
    env::set_var("TWILIO_AUTH_TOKEN", "twilio-secret-token");
    env::set_var("TWILIO_FROM_NUMBER", "+15005550006");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 9100);
    assert_eq!(config.database.url, DatabaseUrl::Memory);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.notifications.public_base_url, "https://book.salon.test");
    assert!(!config.jobs.enabled);
    assert_eq!(
        config.cors_origins,
        vec![
            "https://salon.test".to_owned(),
            "https://admin.salon.test".to_owned()
        ]
    );
    assert!(config.notifications.sms_configured());

    let summary = config.summary();
    assert!(summary.contains("sms=twilio"));
    assert!(summary.contains("jobs=disabled"));
    assert!(!summary.contains("twilio-secret-token"));
    clear_env();
}

#[test]
#[serial]
fn test_production_requires_jwt_secret() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("JWT_SECRET"));

    env::set_var("JWT_SECRET", "a-long-production-secret-value");
    let config = ServerConfig::from_env().unwrap();
    assert!(config.environment.is_production());
    assert_eq!(config.auth.jwt_secret, "a-long-production-secret-value");
    clear_env();
}

#[test]
#[serial]
fn test_bad_numbers_are_errors() {
    clear_env();
    env::set_var("JOBS_INTERVAL_SECS", "0");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("JOBS_INTERVAL_SECS"));

    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("HTTP_PORT"));
    clear_env();
}
