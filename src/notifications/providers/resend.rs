// ABOUTME: Resend email API client
// ABOUTME: JSON POST to /emails with a bearer API key; returns the email id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::EmailProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: Option<String>,
}

/// Resend email client
pub struct ResendEmailProvider {
    http_client: reqwest::Client,
    emails_url: String,
    api_key: String,
    from_address: String,
}

impl ResendEmailProvider {
    /// Create a client against `base_url` (normally `https://api.resend.com`)
    #[must_use]
    pub fn new(base_url: &str, api_key: String, from_address: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            emails_url: format!("{}/emails", base_url.trim_end_matches('/')),
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl EmailProvider for ResendEmailProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<String> {
        let request = SendEmailRequest {
            from: &self.from_address,
            to: [to],
            subject,
            text: body,
        };

        let response = self
            .http_client
            .post(&self.emails_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::new(ErrorCode::ExternalServiceUnavailable, format!("Resend: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ResendError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(if status == StatusCode::UNPROCESSABLE_ENTITY {
                AppError::new(
                    ErrorCode::RecipientUnreachable,
                    format!("Resend rejected recipient: {message}"),
                )
            } else {
                AppError::external_service("Resend", message)
            });
        }

        let sent: SendEmailResponse = response.json().await.map_err(|e| {
            AppError::external_service("Resend", format!("JSON parse error: {e}"))
        })?;
        Ok(sent.id)
    }
}
