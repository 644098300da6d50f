// ABOUTME: Customer message templates and `{{placeholder}}` rendering
// ABOUTME: Builds confirmation, reminder, status, waitlist offer, report card and campaign messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::formatters::{
    format_appointment_datetime, format_appointment_window, format_cents, format_date_short,
    format_duration, format_phone_number, format_time,
};
use crate::models::{
    Appointment, AppointmentStatus, BusinessSettings, Campaign, Customer, Pet, ReportCard,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// Placeholders a campaign body may use
pub const ALLOWED_PLACEHOLDERS: &[&str] = &[
    "first_name",
    "last_name",
    "pet_name",
    "business_name",
    "booking_url",
];

/// A message ready for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    /// Email subject
    pub subject: Option<String>,
    /// Plain-text body
    pub body: String,
}

/// Shared facts about an appointment for transactional messages
#[derive(Debug, Clone)]
pub struct AppointmentContext {
    /// Salon name
    pub business_name: String,
    /// Salon phone for "call us" lines
    pub business_phone: Option<String>,
    /// Customer's first name
    pub first_name: String,
    /// Pet's name
    pub pet_name: String,
    /// Service name
    pub service_name: String,
    /// Salon-local start
    pub scheduled_at: NaiveDateTime,
    /// Minutes
    pub duration_minutes: u32,
    /// Total price (cents)
    pub total_price_cents: i64,
}

impl AppointmentContext {
    /// Gather the message facts for one appointment
    #[must_use]
    pub fn new(
        settings: &BusinessSettings,
        customer: &Customer,
        pet: &Pet,
        service_name: &str,
        appointment: &Appointment,
    ) -> Self {
        Self {
            business_name: settings.business_name.clone(),
            business_phone: settings.phone.clone(),
            first_name: customer.first_name.clone(),
            pet_name: pet.name.clone(),
            service_name: service_name.to_owned(),
            scheduled_at: appointment.scheduled_at,
            duration_minutes: appointment.duration_minutes,
            total_price_cents: appointment.total_price_cents,
        }
    }

    fn call_us(&self) -> String {
        self.business_phone
            .as_deref()
            .map(|phone| format!(" Questions? Call us at {}.", format_phone_number(phone)))
            .unwrap_or_default()
    }
}

/// Facts for a waitlist offer message
#[derive(Debug, Clone)]
pub struct OfferContext {
    /// Salon name
    pub business_name: String,
    /// Customer's first name
    pub first_name: String,
    /// Pet's name
    pub pet_name: String,
    /// Service name
    pub service_name: String,
    /// Salon-local slot start
    pub slot_start: NaiveDateTime,
    /// Minutes
    pub duration_minutes: u32,
    /// Salon-local deadline
    pub expires_at: NaiveDateTime,
    /// Link that accepts or declines
    pub respond_url: String,
}

/// Names found between `{{` and `}}`, in order of appearance
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let name = after[..close].trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
        rest = &after[close + 2..];
    }
    names
}

/// Placeholders outside [`ALLOWED_PLACEHOLDERS`]
#[must_use]
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| !ALLOWED_PLACEHOLDERS.contains(&name.as_str()))
        .collect()
}

/// Substitute `{{name}}` (spaces inside the braces allowed)
///
/// Names without a value are left as written.
#[must_use]
pub fn render_placeholders(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let token = &rest[open..open + 2 + close + 2];
        match vars.get(after[..close].trim()) {
            Some(value) => out.push_str(value),
            None => out.push_str(token),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

/// Booking received (pending) or booked (confirmed)
#[must_use]
pub fn booking_confirmation(
    ctx: &AppointmentContext,
    status: AppointmentStatus,
) -> RenderedMessage {
    let when = format_appointment_datetime(ctx.scheduled_at);
    let (subject, lead) = if status == AppointmentStatus::Pending {
        (
            format!("We received your booking request for {}", ctx.pet_name),
            format!(
                "Hi {}, thanks for booking with {}! We received your request for {}'s {} on {}. We'll confirm shortly.",
                ctx.first_name, ctx.business_name, ctx.pet_name, ctx.service_name, when
            ),
        )
    } else {
        (
            format!("{}'s appointment is confirmed", ctx.pet_name),
            format!(
                "Hi {}, {}'s {} at {} is confirmed for {}.",
                ctx.first_name, ctx.pet_name, ctx.service_name, ctx.business_name, when
            ),
        )
    };
    RenderedMessage {
        subject: Some(subject),
        body: format!(
            "{lead} Estimated time: {}. Estimated total: {}.{}",
            format_duration(ctx.duration_minutes),
            format_cents(ctx.total_price_cents),
            ctx.call_us()
        ),
    }
}

/// Day-before reminder
#[must_use]
pub fn appointment_reminder(ctx: &AppointmentContext) -> RenderedMessage {
    RenderedMessage {
        subject: Some(format!(
            "Reminder: {}'s grooming on {}",
            ctx.pet_name,
            format_date_short(ctx.scheduled_at.date())
        )),
        body: format!(
            "Hi {}, a reminder that {} is booked for a {} at {} on {} ({}).{}",
            ctx.first_name,
            ctx.pet_name,
            ctx.service_name,
            ctx.business_name,
            format_appointment_datetime(ctx.scheduled_at),
            format_appointment_window(ctx.scheduled_at, ctx.duration_minutes),
            ctx.call_us()
        ),
    }
}

/// Status change customers care about; `None` for internal-only changes
#[must_use]
pub fn status_update(
    ctx: &AppointmentContext,
    status: AppointmentStatus,
    reason: Option<&str>,
) -> Option<RenderedMessage> {
    let when = format_appointment_datetime(ctx.scheduled_at);
    let (subject, body) = match status {
        AppointmentStatus::Confirmed => (
            format!("{}'s appointment is confirmed", ctx.pet_name),
            format!(
                "Hi {}, good news! {}'s {} on {} is confirmed.",
                ctx.first_name, ctx.pet_name, ctx.service_name, when
            ),
        ),
        AppointmentStatus::Cancelled => {
            let why = reason
                .map(|r| format!(" Reason: {}.", r.trim_end_matches('.')))
                .unwrap_or_default();
            (
                format!("{}'s appointment was cancelled", ctx.pet_name),
                format!(
                    "Hi {}, {}'s {} on {} has been cancelled.{}",
                    ctx.first_name, ctx.pet_name, ctx.service_name, when, why
                ),
            )
        }
        AppointmentStatus::Completed => (
            format!("{} is ready for pickup", ctx.pet_name),
            format!(
                "Hi {}, {} is all done and looking great! Ready for pickup at {}.",
                ctx.first_name, ctx.pet_name, ctx.business_name
            ),
        ),
        _ => return None,
    };
    Some(RenderedMessage {
        subject: Some(subject),
        body: format!("{body}{}", ctx.call_us()),
    })
}

/// Freed-slot offer with its deadline and response link
#[must_use]
pub fn waitlist_offer(ctx: &OfferContext) -> RenderedMessage {
    let deadline = if ctx.expires_at.date() == ctx.slot_start.date() {
        format_time(ctx.expires_at.time())
    } else {
        format_appointment_datetime(ctx.expires_at)
    };
    RenderedMessage {
        subject: Some(format!("A spot opened up for {}", ctx.pet_name)),
        body: format!(
            "Hi {}, a {} opening for {} is available at {} on {} ({}). Reply by {} to claim it: {}",
            ctx.first_name,
            ctx.service_name,
            ctx.pet_name,
            ctx.business_name,
            format_appointment_datetime(ctx.slot_start),
            format_duration(ctx.duration_minutes),
            deadline,
            ctx.respond_url
        ),
    }
}

/// Post-visit report card
#[must_use]
pub fn report_card(
    business_name: &str,
    first_name: &str,
    pet_name: &str,
    card: &ReportCard,
) -> RenderedMessage {
    let mut body = format!(
        "Hi {first_name}, here is {pet_name}'s report card from {business_name}.\n\n{}\n\nBehavior: {}/5",
        card.groomer_notes, card.behavior_rating
    );
    if let Some(coat) = &card.coat_condition {
        body.push_str(&format!("\nCoat: {coat}"));
    }
    if let Some(tips) = &card.recommendations {
        body.push_str(&format!("\nAt home: {tips}"));
    }
    if let Some(weeks) = card.next_visit_weeks {
        body.push_str(&format!("\nNext visit: in about {weeks} weeks"));
    }
    for url in &card.photo_urls {
        body.push_str(&format!("\n{url}"));
    }
    RenderedMessage {
        subject: Some(format!("{pet_name}'s report card")),
        body,
    }
}

/// Campaign body and subject rendered for one customer
#[must_use]
pub fn campaign_message(campaign: &Campaign, vars: &HashMap<&str, String>) -> RenderedMessage {
    RenderedMessage {
        subject: campaign
            .subject
            .as_deref()
            .map(|s| render_placeholders(s, vars)),
        body: render_placeholders(&campaign.body, vars),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default()
    }

    fn context() -> AppointmentContext {
        AppointmentContext {
            business_name: "Pampered Paws".to_owned(),
            business_phone: Some("+16572522903".to_owned()),
            first_name: "Ana".to_owned(),
            pet_name: "Biscuit".to_owned(),
            service_name: "Full Groom".to_owned(),
            scheduled_at: at(4, 14, 30),
            duration_minutes: 90,
            total_price_cents: 8000,
        }
    }

    #[test]
    fn test_render_placeholders() {
        let vars = HashMap::from([
            ("first_name", "Ana".to_owned()),
            ("pet_name", "Biscuit".to_owned()),
        ]);
        assert_eq!(
            render_placeholders("Hi {{first_name}}, {{ pet_name }} misses you! {{other}}", &vars),
            "Hi Ana, Biscuit misses you! {{other}}"
        );
        assert_eq!(render_placeholders("Unclosed {{first_name", &vars), "Unclosed {{first_name");
    }

    #[test]
    fn test_unknown_placeholders() {
        assert!(unknown_placeholders("{{first_name}} {{booking_url}}").is_empty());
        assert_eq!(
            unknown_placeholders("{{first_name}} {{discount}} {{discount}} {{ zip }}"),
            vec!["discount", "zip"]
        );
    }

    #[test]
    fn test_confirmation_mentions_price_and_phone() {
        let message = booking_confirmation(&context(), AppointmentStatus::Confirmed);
        assert!(message.body.contains("Tuesday, March 4, 2025 at 2:30 PM"));
        assert!(message.body.contains("$80.00"));
        assert!(message.body.contains("1 hr 30 min"));
        assert!(message.body.contains("(657) 252-2903"));
    }

    #[test]
    fn test_status_update_only_for_customer_visible_changes() {
        assert!(status_update(&context(), AppointmentStatus::CheckedIn, None).is_none());
        let cancelled =
            status_update(&context(), AppointmentStatus::Cancelled, Some("Groomer out sick."))
                .unwrap_or_else(|| RenderedMessage {
                    subject: None,
                    body: String::new(),
                });
        assert!(cancelled.body.contains("Reason: Groomer out sick."));
    }

    #[test]
    fn test_offer_includes_deadline_and_link() {
        let message = waitlist_offer(&OfferContext {
            business_name: "Pampered Paws".to_owned(),
            first_name: "Ana".to_owned(),
            pet_name: "Biscuit".to_owned(),
            service_name: "Bath & Brush".to_owned(),
            slot_start: at(5, 15, 0),
            duration_minutes: 60,
            expires_at: at(5, 11, 0),
            respond_url: "https://salon.example/offers/1?token=abc".to_owned(),
        });
        assert!(message.body.contains("Reply by 11:00 AM"));
        assert!(message.body.ends_with("token=abc"));
    }
}
