// ABOUTME: SMS and email provider abstraction with Twilio, Resend and in-memory mock backends
// ABOUTME: Real providers are chosen when credentials are configured, mocks otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Messaging providers
//!
//! The service layer only sees [`SmsProvider`] and [`EmailProvider`] trait
//! objects. [`from_config`] wires Twilio and Resend when their credentials are
//! present and falls back to the recording mocks otherwise, so a development
//! server never sends real messages by accident.

use crate::config::NotificationConfig;
use crate::errors::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Recording providers for development and tests
pub mod mock;
/// Resend email API client
pub mod resend;
/// Twilio Messages API client
pub mod twilio;

pub use mock::{MockEmailProvider, MockSmsProvider, SentMessage};
pub use resend::ResendEmailProvider;
pub use twilio::TwilioSmsProvider;

/// Sends text messages
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Deliver `body` to an E.164 number, returning the provider message id
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<String>;
}

/// Sends email
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Deliver a plain-text email, returning the provider message id
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<String>;
}

/// Provider pair handed to the notification service
#[derive(Clone)]
pub struct Providers {
    /// SMS backend
    pub sms: Arc<dyn SmsProvider>,
    /// Email backend
    pub email: Arc<dyn EmailProvider>,
}

/// Pick real providers when credentials are present
#[must_use]
pub fn from_config(config: &NotificationConfig) -> Providers {
    let sms: Arc<dyn SmsProvider> = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from_number,
    ) {
        (Some(sid), Some(token), Some(from)) => Arc::new(TwilioSmsProvider::new(
            &config.twilio_api_base,
            sid.clone(),
            token.clone(),
            from.clone(),
        )),
        _ => Arc::new(MockSmsProvider::new()),
    };

    let email: Arc<dyn EmailProvider> = match (&config.resend_api_key, &config.email_from_address)
    {
        (Some(key), Some(from)) => Arc::new(ResendEmailProvider::new(
            &config.resend_api_base,
            key.clone(),
            from.clone(),
        )),
        _ => Arc::new(MockEmailProvider::new()),
    };

    info!(
        sms.provider = sms.name(),
        email.provider = email.name(),
        "Messaging providers selected"
    );

    Providers { sms, email }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mocks_without_credentials() {
        let providers = from_config(&NotificationConfig::default());
        assert_eq!(providers.sms.name(), "mock-sms");
        assert_eq!(providers.email.name(), "mock-email");
    }

    #[test]
    fn test_real_providers_with_credentials() {
        let config = NotificationConfig {
            twilio_account_sid: Some("AC123".to_owned()),
            twilio_auth_token: Some("token".to_owned()),
            twilio_from_number: Some("+15005550006".to_owned()),
            twilio_api_base: "https://api.twilio.com".to_owned(),
            resend_api_key: Some("re_123".to_owned()),
            resend_api_base: "https://api.resend.com".to_owned(),
            email_from_address: Some("salon@example.com".to_owned()),
            public_base_url: "http://localhost".to_owned(),
        };
        let providers = from_config(&config);
        assert_eq!(providers.sms.name(), "twilio");
        assert_eq!(providers.email.name(), "resend");
    }
}
