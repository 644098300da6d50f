// ABOUTME: Twilio Messages API client for outbound SMS
// ABOUTME: Form-encoded POST with HTTP basic auth; returns the message SID
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::SmsProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Twilio error codes that mean the number can never receive our texts
const UNREACHABLE_CODES: &[i64] = &[
    21211, // invalid 'To' number
    21610, // recipient replied STOP
    21614, // not a mobile number
];

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<i64>,
    message: Option<String>,
}

/// Twilio SMS client
pub struct TwilioSmsProvider {
    http_client: reqwest::Client,
    messages_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsProvider {
    /// Create a client against `base_url` (normally `https://api.twilio.com`)
    #[must_use]
    pub fn new(
        base_url: &str,
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            messages_url: format!(
                "{}/2010-04-01/Accounts/{account_sid}/Messages.json",
                base_url.trim_end_matches('/')
            ),
            account_sid,
            auth_token,
            from_number,
        }
    }
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn send_sms(&self, to: &str, body: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| {
                AppError::new(ErrorCode::ExternalServiceUnavailable, format!("Twilio: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error: TwilioError = response.json().await.unwrap_or(TwilioError {
                code: None,
                message: None,
            });
            let message = error
                .message
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(match error.code {
                Some(code) if UNREACHABLE_CODES.contains(&code) => AppError::new(
                    ErrorCode::RecipientUnreachable,
                    format!("Twilio rejected recipient ({code}): {message}"),
                ),
                Some(code) => {
                    AppError::external_service("Twilio", format!("error {code}: {message}"))
                }
                None => AppError::external_service("Twilio", message),
            });
        }

        let message: MessageResponse = response.json().await.map_err(|e| {
            AppError::external_service("Twilio", format!("JSON parse error: {e}"))
        })?;
        debug!(sid = %message.sid, "Twilio accepted message");
        Ok(message.sid)
    }
}
