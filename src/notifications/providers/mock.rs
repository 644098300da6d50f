// ABOUTME: In-memory SMS and email providers that record deliveries
// ABOUTME: Used when no credentials are configured and throughout the test suite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::{EmailProvider, SmsProvider};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// A message captured by a mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient
    pub to: String,
    /// Email subject (None for SMS)
    pub subject: Option<String>,
    /// Body
    pub body: String,
    /// Fake provider id
    pub provider_id: String,
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl Recorder {
    async fn record(
        &self,
        to: &str,
        subject: Option<&str>,
        body: &str,
        prefix: &str,
    ) -> AppResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service(prefix, "simulated provider outage"));
        }
        let provider_id = format!("{prefix}_{}", Uuid::new_v4().simple());
        debug!(to = %to, provider_id = %provider_id, "Mock delivery recorded");
        self.sent.lock().await.push(SentMessage {
            to: to.to_owned(),
            subject: subject.map(str::to_owned),
            body: body.to_owned(),
            provider_id: provider_id.clone(),
        });
        Ok(provider_id)
    }
}

/// Records texts instead of sending them
#[derive(Default)]
pub struct MockSmsProvider {
    recorder: Recorder,
}

impl MockSmsProvider {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text recorded so far
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.recorder.sent.lock().await.clone()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, failing: bool) {
        self.recorder.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsProvider for MockSmsProvider {
    fn name(&self) -> &'static str {
        "mock-sms"
    }

    async fn send_sms(&self, to: &str, body: &str) -> AppResult<String> {
        self.recorder.record(to, None, body, "SM").await
    }
}

/// Records emails instead of sending them
#[derive(Default)]
pub struct MockEmailProvider {
    recorder: Recorder,
}

impl MockEmailProvider {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email recorded so far
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.recorder.sent.lock().await.clone()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, failing: bool) {
        self.recorder.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    fn name(&self) -> &'static str {
        "mock-email"
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<String> {
        self.recorder.record(to, Some(subject), body, "em").await
    }
}
