// ABOUTME: Notification delivery with channel resolution, consent checks and a log row per message
// ABOUTME: Every attempt is recorded as pending, then sent, failed or skipped; failed rows can be retried
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::providers::{EmailProvider, Providers, SmsProvider};
use super::templates::RenderedMessage;
use crate::constants::notifications::MAX_DELIVERY_ATTEMPTS;
use crate::database::{Database, NewNotificationLog};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{
    ContactPreference, Customer, DeliveryStatus, NotificationChannel, NotificationKind,
    NotificationLog,
};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_EMAIL_SUBJECT: &str = "A message from your grooming salon";

/// One message for one customer
#[derive(Debug, Clone)]
pub struct NotificationRequest<'a> {
    /// Recipient
    pub customer: &'a Customer,
    /// What the message is about
    pub kind: NotificationKind,
    /// Rendered content
    pub message: RenderedMessage,
    /// Fixed channel (campaigns); otherwise the customer's preference decides
    pub channel: Option<NotificationChannel>,
    /// Related appointment
    pub appointment_id: Option<Uuid>,
    /// Related campaign
    pub campaign_id: Option<Uuid>,
}

/// Where a message goes, or why it does not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelDecision {
    /// Deliver on this channel
    Send {
        /// Channel
        channel: NotificationChannel,
        /// Phone or email address
        recipient: String,
    },
    /// Record a skipped row
    Skip {
        /// Channel that would have been used
        channel: NotificationChannel,
        /// Address on file, possibly empty
        recipient: String,
        /// Why nothing was sent
        reason: String,
    },
}

fn address(customer: &Customer, channel: NotificationChannel) -> Option<&str> {
    match channel {
        NotificationChannel::Sms => customer.sms_address(),
        NotificationChannel::Email => customer.email_address(),
    }
}

fn raw_address(customer: &Customer, channel: NotificationChannel) -> String {
    match channel {
        NotificationChannel::Sms => customer.phone.clone(),
        NotificationChannel::Email => customer.email.clone(),
    }
    .unwrap_or_default()
}

const fn other(channel: NotificationChannel) -> NotificationChannel {
    match channel {
        NotificationChannel::Sms => NotificationChannel::Email,
        NotificationChannel::Email => NotificationChannel::Sms,
    }
}

fn unreachable_reason(customer: &Customer, channel: NotificationChannel) -> String {
    let (has_address, opted_in) = match channel {
        NotificationChannel::Sms => (customer.phone.is_some(), customer.sms_opt_in),
        NotificationChannel::Email => (customer.email.is_some(), customer.email_opt_in),
    };
    if has_address && !opted_in {
        format!("Customer opted out of {channel}")
    } else {
        format!("No {channel} address on file")
    }
}

/// Decide the channels for a message
///
/// Transactional messages follow the customer's preference and fall back to
/// the other channel when the preferred one is unreachable. Marketing needs
/// `marketing_opt_in` and never falls back.
#[must_use]
pub fn plan_delivery(
    customer: &Customer,
    kind: NotificationKind,
    forced: Option<NotificationChannel>,
) -> Vec<ChannelDecision> {
    let preferred: Vec<NotificationChannel> = match (forced, customer.preferred_channel) {
        (Some(channel), _) => vec![channel],
        (None, ContactPreference::Sms) => vec![NotificationChannel::Sms],
        (None, ContactPreference::Email) => vec![NotificationChannel::Email],
        (None, ContactPreference::Both) => {
            vec![NotificationChannel::Sms, NotificationChannel::Email]
        }
    };
    let primary = preferred
        .first()
        .copied()
        .unwrap_or(NotificationChannel::Sms);

    if kind.is_marketing() && !customer.marketing_opt_in {
        return vec![ChannelDecision::Skip {
            channel: primary,
            recipient: raw_address(customer, primary),
            reason: "Customer has not opted in to marketing".to_owned(),
        }];
    }

    let mut decisions: Vec<ChannelDecision> = preferred
        .iter()
        .filter_map(|&channel| {
            address(customer, channel).map(|to| ChannelDecision::Send {
                channel,
                recipient: to.to_owned(),
            })
        })
        .collect();

    if decisions.is_empty() && !kind.is_marketing() && forced.is_none() {
        let fallback = other(primary);
        if !preferred.contains(&fallback) {
            if let Some(to) = address(customer, fallback) {
                decisions.push(ChannelDecision::Send {
                    channel: fallback,
                    recipient: to.to_owned(),
                });
            }
        }
    }

    if decisions.is_empty() {
        decisions.push(ChannelDecision::Skip {
            channel: primary,
            recipient: raw_address(customer, primary),
            reason: unreachable_reason(customer, primary),
        });
    }
    decisions
}

/// Sends customer messages and keeps the notification log
#[derive(Clone)]
pub struct NotificationService {
    database: Arc<Database>,
    sms: Arc<dyn SmsProvider>,
    email: Arc<dyn EmailProvider>,
}

impl NotificationService {
    /// Create a service over a provider pair
    #[must_use]
    pub fn new(database: Arc<Database>, providers: Providers) -> Self {
        Self {
            database,
            sms: providers.sms,
            email: providers.email,
        }
    }

    /// Send a message on every resolved channel
    ///
    /// Provider failures are recorded on the log row, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the log cannot be written
    pub async fn send(&self, request: NotificationRequest<'_>) -> AppResult<Vec<NotificationLog>> {
        let decisions = plan_delivery(request.customer, request.kind, request.channel);
        let mut logs = Vec::with_capacity(decisions.len());

        for decision in decisions {
            let (channel, recipient, skip_reason) = match decision {
                ChannelDecision::Send { channel, recipient } => (channel, recipient, None),
                ChannelDecision::Skip {
                    channel,
                    recipient,
                    reason,
                } => (channel, recipient, Some(reason)),
            };
            let subject = match channel {
                NotificationChannel::Email => Some(
                    request
                        .message
                        .subject
                        .clone()
                        .unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT.to_owned()),
                ),
                NotificationChannel::Sms => None,
            };

            let log = self
                .database
                .create_notification_log(&NewNotificationLog {
                    customer_id: Some(request.customer.id),
                    appointment_id: request.appointment_id,
                    campaign_id: request.campaign_id,
                    channel,
                    kind: request.kind,
                    recipient,
                    subject,
                    body: request.message.body.clone(),
                })
                .await?;

            if let Some(reason) = skip_reason {
                self.database.skip_notification(log.id, &reason).await?;
                logs.push(
                    self.database
                        .get_notification_log(log.id)
                        .await?
                        .ok_or_else(|| AppError::not_found("Notification log"))?,
                );
            } else {
                logs.push(self.deliver(&log).await?);
            }
        }

        Ok(logs)
    }

    /// Re-send a Failed row
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id and `RESOURCE_LOCKED`
    /// when the row is not Failed or has used up its attempts
    pub async fn retry(&self, log_id: Uuid) -> AppResult<NotificationLog> {
        let log = self
            .database
            .get_notification_log(log_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification log"))?;

        if log.status != DeliveryStatus::Failed {
            return Err(AppError::locked(format!(
                "Only failed notifications can be retried (this one is {})",
                log.status
            )));
        }
        if log.attempts >= MAX_DELIVERY_ATTEMPTS {
            return Err(AppError::locked(format!(
                "Notification already attempted {} times",
                log.attempts
            )));
        }

        self.deliver(&log).await
    }

    async fn deliver(&self, log: &NotificationLog) -> AppResult<NotificationLog> {
        let outcome = match log.channel {
            NotificationChannel::Sms => self.sms.send_sms(&log.recipient, &log.body).await,
            NotificationChannel::Email => {
                let subject = log.subject.as_deref().unwrap_or(DEFAULT_EMAIL_SUBJECT);
                self.email
                    .send_email(&log.recipient, subject, &log.body)
                    .await
            }
        };

        match outcome {
            Ok(provider_id) => {
                let updated = self
                    .database
                    .record_notification_attempt(
                        log.id,
                        DeliveryStatus::Sent,
                        Some(&provider_id),
                        None,
                    )
                    .await?;
                AppLogger::log_notification_sent(
                    &updated.id.to_string(),
                    updated.channel.as_str(),
                    updated.kind.as_str(),
                    updated.attempts,
                );
                Ok(updated)
            }
            Err(error) => {
                AppLogger::log_notification_failed(
                    &log.id.to_string(),
                    log.channel.as_str(),
                    log.kind.as_str(),
                    &error.message,
                );
                self.database
                    .record_notification_attempt(
                        log.id,
                        DeliveryStatus::Failed,
                        None,
                        Some(&error.message),
                    )
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer(preference: ContactPreference) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            first_name: "Ana".to_owned(),
            last_name: "Lopez".to_owned(),
            email: Some("ana@example.com".to_owned()),
            phone: Some("+16572522903".to_owned()),
            preferred_channel: preference,
            sms_opt_in: true,
            email_opt_in: true,
            marketing_opt_in: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn channels(decisions: &[ChannelDecision]) -> Vec<NotificationChannel> {
        decisions
            .iter()
            .filter_map(|d| match d {
                ChannelDecision::Send { channel, .. } => Some(*channel),
                ChannelDecision::Skip { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_preference_drives_channels() {
        let kind = NotificationKind::BookingConfirmation;
        assert_eq!(
            channels(&plan_delivery(&customer(ContactPreference::Sms), kind, None)),
            vec![NotificationChannel::Sms]
        );
        assert_eq!(
            channels(&plan_delivery(&customer(ContactPreference::Both), kind, None)),
            vec![NotificationChannel::Sms, NotificationChannel::Email]
        );
    }

    #[test]
    fn test_transactional_falls_back_to_other_channel() {
        let mut c = customer(ContactPreference::Sms);
        c.sms_opt_in = false;
        assert_eq!(
            channels(&plan_delivery(&c, NotificationKind::WaitlistOffer, None)),
            vec![NotificationChannel::Email]
        );
    }

    #[test]
    fn test_marketing_requires_consent() {
        let c = customer(ContactPreference::Email);
        let decisions =
            plan_delivery(&c, NotificationKind::Campaign, Some(NotificationChannel::Email));
        assert!(matches!(
            decisions.as_slice(),
            [ChannelDecision::Skip { reason, .. }] if reason.contains("marketing")
        ));
    }

    #[test]
    fn test_unreachable_customer_is_skipped() {
        let mut c = customer(ContactPreference::Sms);
        c.phone = None;
        c.email_opt_in = false;
        let decisions = plan_delivery(&c, NotificationKind::AppointmentReminder, None);
        assert!(matches!(
            decisions.as_slice(),
            [ChannelDecision::Skip { channel: NotificationChannel::Sms, reason, .. }]
                if reason == "No sms address on file"
        ));
    }
}
