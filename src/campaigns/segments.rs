// ABOUTME: Audience segment evaluation against per-customer summaries
// ABOUTME: Decides who a campaign targets before channel consent is applied
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::database::CustomerSummary;
use crate::models::{AudienceSegment, Customer, NotificationChannel};
use chrono::{Duration, NaiveDate};

/// Segment membership test
pub trait SegmentMatch {
    /// Whether `summary` belongs to the segment on salon-local `today`
    fn matches(&self, summary: &CustomerSummary, today: NaiveDate) -> bool;
}

impl SegmentMatch for AudienceSegment {
    fn matches(&self, summary: &CustomerSummary, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Lapsed { days } => summary
                .last_visit
                .is_some_and(|visit| (today - visit.date()).num_days() >= i64::from(*days)),
            Self::Species { species } => summary.species.contains(species),
            Self::PetSize { size } => summary.sizes.contains(size),
            Self::NewCustomers { days } => {
                summary.first_seen.date_naive() >= today - Duration::days(i64::from(*days))
            }
        }
    }
}

/// Marketing address for `channel`, when the customer agreed to marketing
#[must_use]
pub fn marketing_address(customer: &Customer, channel: NotificationChannel) -> Option<&str> {
    if !customer.marketing_opt_in {
        return None;
    }
    match channel {
        NotificationChannel::Sms => customer.sms_address(),
        NotificationChannel::Email => customer.email_address(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactPreference, PetSize, PetSpecies};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
    }

    fn summary(days_since_visit: Option<i64>, joined_days_ago: i64) -> CustomerSummary {
        let joined = Utc
            .from_utc_datetime(&today().and_hms_opt(12, 0, 0).unwrap_or_default())
            - Duration::days(joined_days_ago);
        CustomerSummary {
            customer: Customer {
                id: Uuid::new_v4(),
                first_name: "Dana".into(),
                last_name: "Lopez".into(),
                email: Some("dana@example.com".into()),
                phone: Some("+15035550100".into()),
                preferred_channel: ContactPreference::Sms,
                sms_opt_in: true,
                email_opt_in: true,
                marketing_opt_in: true,
                notes: None,
                created_at: joined,
                updated_at: joined,
            },
            species: vec![PetSpecies::Dog],
            sizes: vec![PetSize::Large],
            last_visit: days_since_visit.map(|d| {
                (today() - Duration::days(d))
                    .and_hms_opt(10, 0, 0)
                    .unwrap_or_default()
            }),
            first_seen: joined,
        }
    }

    #[test]
    fn test_lapsed_needs_a_past_visit() {
        let segment = AudienceSegment::Lapsed { days: 60 };
        assert!(segment.matches(&summary(Some(60), 400), today()));
        assert!(!segment.matches(&summary(Some(59), 400), today()));
        assert!(!segment.matches(&summary(None, 400), today()));
    }

    #[test]
    fn test_pet_filters() {
        let s = summary(None, 10);
        assert!(AudienceSegment::Species { species: PetSpecies::Dog }.matches(&s, today()));
        assert!(!AudienceSegment::Species { species: PetSpecies::Cat }.matches(&s, today()));
        assert!(AudienceSegment::PetSize { size: PetSize::Large }.matches(&s, today()));
        assert!(!AudienceSegment::PetSize { size: PetSize::Small }.matches(&s, today()));
    }

    #[test]
    fn test_new_customers() {
        let segment = AudienceSegment::NewCustomers { days: 30 };
        assert!(segment.matches(&summary(None, 30), today()));
        assert!(!segment.matches(&summary(None, 31), today()));
        assert!(AudienceSegment::All.matches(&summary(None, 900), today()));
    }

    #[test]
    fn test_marketing_address_requires_consent() {
        let mut s = summary(None, 1);
        assert_eq!(
            marketing_address(&s.customer, NotificationChannel::Email),
            Some("dana@example.com")
        );
        s.customer.sms_opt_in = false;
        assert_eq!(marketing_address(&s.customer, NotificationChannel::Sms), None);
        s.customer.marketing_opt_in = false;
        assert_eq!(marketing_address(&s.customer, NotificationChannel::Email), None);
    }
}
