// ABOUTME: Request body validation at the API boundary
// ABOUTME: Accumulates per-field errors and converts them into a single INVALID_INPUT error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Input validation
//!
//! Every create/update body implements [`Validate`]. Column constraints still
//! live in the schema; these checks catch bad input before it gets there and
//! report every problem at once.

use crate::constants::limits::{
    MAX_CAMPAIGN_BODY_LENGTH, MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_PET_WEIGHT_LBS,
    MAX_REPORT_CARD_PHOTOS, MAX_SUBJECT_LENGTH,
};
use crate::database::{
    AddonInput, CampaignUpdate, CustomerInput, NewCampaign, NewReportCard, NewWaitlistEntry,
    PetInput, ServiceInput,
};
use crate::errors::{AppError, AppResult};
use crate::formatters::is_valid_phone;
use crate::models::{BusinessSettings, ContactPreference, NotificationChannel};
use crate::notifications::templates::unknown_placeholders;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use uuid::Uuid;

static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Practical email check: one `@`, no spaces, a dotted domain
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()))
}

/// Whether the string is a UUID
#[must_use]
pub fn is_valid_uuid(raw: &str) -> bool {
    Uuid::parse_str(raw).is_ok()
}

/// Parse a UUID, naming the field in the error
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the value is not a UUID
pub fn parse_uuid(field: &str, raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid_input(format!("{field} must be a valid UUID")))
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path (`customer.email`)
    pub field: String,
    /// What is wrong
    pub message: String,
}

/// Collected field errors
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record `message` unless `ok`
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Non-blank text no longer than `max` characters
    pub fn text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        } else if value.chars().count() > max {
            self.add(field, format!("must be at most {max} characters"));
        }
    }

    /// Optional text no longer than `max` characters
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.add(field, format!("must be at most {max} characters"));
            }
        }
    }

    /// Recorded errors
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when empty, otherwise the combined error
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` listing every field error
    pub fn into_result(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let summary = errors
            .errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::invalid_input(summary)
            .with_details(serde_json::json!({ "fields": errors.errors }))
    }
}

/// Boundary validation for request bodies
pub trait Validate {
    /// Check the value, reporting every problem
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` with a `fields` list in the details
    fn validate(&self) -> AppResult<()>;
}

impl Validate for CustomerInput {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("first_name", &self.first_name, MAX_NAME_LENGTH);
        errors.text("last_name", &self.last_name, MAX_NAME_LENGTH);

        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let phone = self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
        if email.is_none() && phone.is_none() {
            errors.add("contact", "an email or phone number is required");
        }
        if let Some(email) = email {
            errors.check(is_valid_email(email), "email", "must be a valid email address");
        }
        if let Some(phone) = phone {
            errors.check(is_valid_phone(phone), "phone", "must be a 10-digit phone number");
        }
        match self.preferred_channel {
            ContactPreference::Sms => {
                errors.check(phone.is_some(), "phone", "is required for SMS contact");
            }
            ContactPreference::Email => {
                errors.check(email.is_some(), "email", "is required for email contact");
            }
            ContactPreference::Both => {}
        }
        errors.optional_text("notes", self.notes.as_deref(), MAX_NOTES_LENGTH);
        errors.into_result()
    }
}

impl Validate for PetInput {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("name", &self.name, MAX_NAME_LENGTH);
        if let Some(weight) = self.weight_lbs {
            errors.check(
                weight > 0.0 && weight <= MAX_PET_WEIGHT_LBS,
                "weight_lbs",
                "must be greater than 0 and at most 250",
            );
        }
        errors.optional_text("breed", self.breed.as_deref(), MAX_NAME_LENGTH);
        errors.optional_text(
            "temperament_notes",
            self.temperament_notes.as_deref(),
            MAX_NOTES_LENGTH,
        );
        errors.optional_text("medical_notes", self.medical_notes.as_deref(), MAX_NOTES_LENGTH);
        errors.into_result()
    }
}

impl Validate for ServiceInput {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("name", &self.name, MAX_NAME_LENGTH);
        errors.check(
            (5..=480).contains(&self.duration_minutes),
            "duration_minutes",
            "must be between 5 and 480",
        );
        for (field, cents) in [
            ("price_small_cents", self.price_small_cents),
            ("price_medium_cents", self.price_medium_cents),
            ("price_large_cents", self.price_large_cents),
            ("price_xlarge_cents", self.price_xlarge_cents),
        ] {
            errors.check(cents >= 0, field, "must not be negative");
        }
        errors.optional_text("description", self.description.as_deref(), MAX_NOTES_LENGTH);
        errors.into_result()
    }
}

impl Validate for AddonInput {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("name", &self.name, MAX_NAME_LENGTH);
        errors.check(self.price_cents >= 0, "price_cents", "must not be negative");
        errors.check(
            self.duration_minutes <= 120,
            "duration_minutes",
            "must be at most 120",
        );
        errors.into_result()
    }
}

impl Validate for NewWaitlistEntry {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.check(
            (-10..=10).contains(&self.priority),
            "priority",
            "must be between -10 and 10",
        );
        errors.optional_text("notes", self.notes.as_deref(), MAX_NOTES_LENGTH);
        errors.into_result()
    }
}

fn validate_campaign_content(
    errors: &mut ValidationErrors,
    channel: NotificationChannel,
    subject: Option<&str>,
    body: &str,
) {
    errors.text("body", body, MAX_CAMPAIGN_BODY_LENGTH);
    let unknown = unknown_placeholders(body);
    if !unknown.is_empty() {
        errors.add("body", format!("unknown placeholders: {}", unknown.join(", ")));
    }
    if channel == NotificationChannel::Email {
        match subject {
            Some(subject) => errors.text("subject", subject, MAX_SUBJECT_LENGTH),
            None => errors.add("subject", "is required for email campaigns"),
        }
    }
}

impl Validate for NewCampaign {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("name", &self.name, MAX_NAME_LENGTH);
        validate_campaign_content(&mut errors, self.channel, self.subject.as_deref(), &self.body);
        errors.into_result()
    }
}

impl Validate for CampaignUpdate {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.text("name", name, MAX_NAME_LENGTH);
        }
        if let Some(body) = &self.body {
            errors.text("body", body, MAX_CAMPAIGN_BODY_LENGTH);
            let unknown = unknown_placeholders(body);
            if !unknown.is_empty() {
                errors.add("body", format!("unknown placeholders: {}", unknown.join(", ")));
            }
        }
        errors.optional_text("subject", self.subject.as_deref(), MAX_SUBJECT_LENGTH);
        errors.into_result()
    }
}

/// Full content check for a campaign after an update is applied
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the merged campaign is not sendable
pub fn validate_campaign(
    channel: NotificationChannel,
    subject: Option<&str>,
    body: &str,
) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    validate_campaign_content(&mut errors, channel, subject, body);
    errors.into_result()
}

fn is_http_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

impl Validate for NewReportCard {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("groomer_notes", &self.groomer_notes, MAX_NOTES_LENGTH);
        errors.check(
            (1..=5).contains(&self.behavior_rating),
            "behavior_rating",
            "must be between 1 and 5",
        );
        errors.check(
            self.photo_urls.len() <= MAX_REPORT_CARD_PHOTOS,
            "photo_urls",
            "has too many photos",
        );
        for (i, url) in self.photo_urls.iter().enumerate() {
            errors.check(
                is_http_url(url),
                &format!("photo_urls[{i}]"),
                "must be an http or https URL",
            );
        }
        if let Some(weeks) = self.next_visit_weeks {
            errors.check((1..=52).contains(&weeks), "next_visit_weeks", "must be between 1 and 52");
        }
        errors.optional_text("coat_condition", self.coat_condition.as_deref(), MAX_NAME_LENGTH);
        errors.optional_text("recommendations", self.recommendations.as_deref(), MAX_NOTES_LENGTH);
        errors.into_result()
    }
}

impl Validate for BusinessSettings {
    fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::new();
        errors.text("business_name", &self.business_name, MAX_NAME_LENGTH);
        for (weekday, hours) in self.hours.days() {
            if let Some(hours) = hours {
                errors.check(
                    hours.close > hours.open,
                    &format!("hours.{}", weekday.to_string().to_lowercase()),
                    "closing time must be after opening time",
                );
            }
        }
        errors.check(
            (5..=120).contains(&self.slot_interval_minutes),
            "slot_interval_minutes",
            "must be between 5 and 120",
        );
        errors.check(self.buffer_minutes <= 120, "buffer_minutes", "must be at most 120");
        errors.check((1..=20).contains(&self.capacity), "capacity", "must be between 1 and 20");
        errors.check(self.booking_lead_hours <= 168, "booking_lead_hours", "must be at most 168");
        errors.check(
            (1..=365).contains(&self.booking_window_days),
            "booking_window_days",
            "must be between 1 and 365",
        );
        errors.check(
            (1..=168).contains(&self.reminder_hours_before),
            "reminder_hours_before",
            "must be between 1 and 168",
        );
        errors.check(
            self.waitlist_window_days <= 30,
            "waitlist_window_days",
            "must be at most 30",
        );
        errors.check(
            (1..=72).contains(&self.offer_deadline_hours),
            "offer_deadline_hours",
            "must be between 1 and 72",
        );
        errors.check(
            (1..=10).contains(&self.max_offer_attempts),
            "max_offer_attempts",
            "must be between 1 and 10",
        );
        if let Some(email) = self.email.as_deref() {
            errors.check(is_valid_email(email), "email", "must be a valid email address");
        }
        if let Some(phone) = self.phone.as_deref() {
            errors.check(is_valid_phone(phone), "phone", "must be a 10-digit phone number");
        }
        errors.optional_text(
            "cancellation_policy",
            Some(self.cancellation_policy.as_str()),
            MAX_NOTES_LENGTH,
        );
        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::{AudienceSegment, DayHours};

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("pat@example.com"));
        assert!(is_valid_email(" pat.smith+dog@mail.example.org "));
        assert!(!is_valid_email("pat@example"));
        assert!(!is_valid_email("pat example@x.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_parse_uuid_names_field() {
        let err = parse_uuid("service_id", "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("service_id"));
        assert!(is_valid_uuid(&Uuid::new_v4().to_string()));
    }

    #[test]
    fn test_customer_requires_some_contact() {
        let input = CustomerInput {
            first_name: "Ana".to_owned(),
            last_name: "Rivera".to_owned(),
            preferred_channel: ContactPreference::Both,
            ..CustomerInput::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.details["fields"][0]["field"], "contact");
    }

    #[test]
    fn test_campaign_rejects_unknown_placeholder() {
        let campaign = NewCampaign {
            name: "Spring".to_owned(),
            channel: NotificationChannel::Sms,
            subject: None,
            body: "Hi {{first_name}}, {{coupon_code}} saves 10%".to_owned(),
            segment: AudienceSegment::All,
        };
        let err = campaign.validate().unwrap_err();
        assert!(err.message.contains("coupon_code"));
    }

    #[test]
    fn test_settings_close_after_open() {
        let mut settings = BusinessSettings::default();
        settings.hours.monday = DayHours::from_hours(18, 8);
        let err = settings.validate().unwrap_err();
        assert_eq!(err.details["fields"][0]["field"], "hours.mon");
        assert!(BusinessSettings::default().validate().is_ok());
    }

    #[test]
    fn test_report_card_photo_urls() {
        let card = NewReportCard {
            appointment_id: Uuid::new_v4(),
            groomer_notes: "Great visit".to_owned(),
            behavior_rating: 6,
            coat_condition: None,
            photo_urls: vec![
                "https://cdn.example.com/a.jpg".to_owned(),
                "ftp://example.com/b.jpg".to_owned(),
            ],
            recommendations: None,
            next_visit_weeks: Some(6),
        };
        let err = card.validate().unwrap_err();
        let fields: Vec<_> = err.details["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(fields, vec!["behavior_rating", "photo_urls[1]"]);
    }
}
