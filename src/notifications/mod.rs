// ABOUTME: Customer notifications over SMS (Twilio) and email (Resend)
// ABOUTME: Templates, provider backends and the delivery service that keeps the notification log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// SMS and email provider backends
pub mod providers;
/// Delivery service and channel resolution
pub mod service;
/// Message templates and placeholder rendering
pub mod templates;

pub use providers::{EmailProvider, Providers, SmsProvider};
pub use service::{plan_delivery, ChannelDecision, NotificationRequest, NotificationService};
pub use templates::{AppointmentContext, OfferContext, RenderedMessage};
