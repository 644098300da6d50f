// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds in-memory resources with recording providers and seeds salon records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `salon_server`
//!
//! Every test gets its own in-memory database with the default catalog
//! seeded, and mock SMS/email providers it can inspect.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use salon_server::{
    booking::salon_now,
    config::ServerConfig,
    database::{CustomerInput, Database, NewAppointment, PetInput},
    models::{
        Appointment, AppointmentStatus, BookingSource, ContactPreference, Customer,
        GroomingService, Pet, PetSize, PetSpecies, StaffUser, UserRole,
    },
    notifications::providers::{MockEmailProvider, MockSmsProvider},
    notifications::Providers,
    resources::ServerResources,
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG raises the level when debugging a failing test
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Resources plus handles on the recording providers behind them
pub struct TestContext {
    pub resources: Arc<ServerResources>,
    pub sms: Arc<MockSmsProvider>,
    pub email: Arc<MockEmailProvider>,
}

impl TestContext {
    pub fn database(&self) -> &Database {
        &self.resources.database
    }
}

/// Fresh in-memory salon with mock providers
pub async fn create_test_context() -> TestContext {
    create_test_context_with(ServerConfig::for_testing()).await
}

/// Fresh in-memory salon with a caller-tuned configuration
pub async fn create_test_context_with(config: ServerConfig) -> TestContext {
    init_test_logging();
    let database = Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    let sms = Arc::new(MockSmsProvider::new());
    let email = Arc::new(MockEmailProvider::new());
    let providers = Providers {
        sms: sms.clone(),
        email: email.clone(),
    };
    let resources = Arc::new(ServerResources::with_providers(
        database, config, providers,
    ));
    TestContext {
        resources,
        sms,
        email,
    }
}

// ============================================================================
// Clock helpers
// ============================================================================

/// Monday 2030-03-04 at 08:00, the fixed "now" for service-level tests
pub fn fixed_now() -> NaiveDateTime {
    at(4, 8, 0)
}

/// A salon-local time in March 2030 (the 4th is a Monday, the 10th a Sunday)
pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 3, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test date")
}

/// First Tuesday to Friday at least `min_days` after today, for tests that
/// go through routes using the real clock
pub fn upcoming_weekday(min_days: i64) -> NaiveDate {
    let mut date = salon_now().date() + Duration::days(min_days);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun | Weekday::Mon) {
        date += Duration::days(1);
    }
    date
}

// ============================================================================
// Seed helpers
// ============================================================================

/// Service from the default catalog by name
pub async fn service_named(database: &Database, name: &str) -> GroomingService {
    database
        .list_services(false)
        .await
        .expect("list services")
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no service named {name}"))
}

/// Customer reachable by SMS and email; marketing consent as given
pub async fn seed_customer(database: &Database, first_name: &str, marketing: bool) -> Customer {
    let slug = Uuid::new_v4().simple().to_string();
    database
        .create_customer(&CustomerInput {
            first_name: first_name.to_owned(),
            last_name: "Tester".to_owned(),
            email: Some(format!("{}.{}@example.com", first_name.to_lowercase(), &slug[..8])),
            phone: Some("+16572522903".to_owned()),
            preferred_channel: ContactPreference::Sms,
            sms_opt_in: true,
            email_opt_in: true,
            marketing_opt_in: marketing,
            notes: None,
        })
        .await
        .expect("create customer")
}

/// Customer with only an email address
pub async fn seed_email_customer(database: &Database, first_name: &str) -> Customer {
    let slug = Uuid::new_v4().simple().to_string();
    database
        .create_customer(&CustomerInput {
            first_name: first_name.to_owned(),
            last_name: "Tester".to_owned(),
            email: Some(format!("{}.{}@example.com", first_name.to_lowercase(), &slug[..8])),
            phone: None,
            preferred_channel: ContactPreference::Email,
            sms_opt_in: true,
            email_opt_in: true,
            marketing_opt_in: true,
            notes: None,
        })
        .await
        .expect("create customer")
}

pub async fn seed_pet(
    database: &Database,
    customer_id: Uuid,
    name: &str,
    species: PetSpecies,
    size: PetSize,
) -> Pet {
    database
        .create_pet(
            customer_id,
            &PetInput {
                name: name.to_owned(),
                species,
                breed: None,
                size: Some(size),
                weight_lbs: None,
                birth_date: None,
                temperament_notes: None,
                medical_notes: None,
            },
        )
        .await
        .expect("create pet")
}

/// Store an appointment directly, skipping availability checks
pub async fn seed_appointment(
    database: &Database,
    customer: &Customer,
    pet: &Pet,
    service: &GroomingService,
    start: NaiveDateTime,
    status: AppointmentStatus,
) -> Appointment {
    database
        .create_appointment(&NewAppointment {
            customer_id: customer.id,
            pet_id: pet.id,
            service_id: service.id,
            groomer_id: None,
            addon_ids: Vec::new(),
            scheduled_at: start,
            duration_minutes: service.duration_minutes,
            total_price_cents: service.price_for(pet.size),
            status,
            source: BookingSource::Admin,
            notes: None,
        })
        .await
        .expect("create appointment")
}

// ============================================================================
// Staff accounts
// ============================================================================

pub const STAFF_PASSWORD: &str = "correct-horse-battery";

/// Create a staff account and return it with a session token
pub async fn create_staff(resources: &ServerResources, role: UserRole) -> (StaffUser, String) {
    let hash = resources
        .auth_manager
        .hash_password(STAFF_PASSWORD)
        .await
        .expect("hash password");
    let email = format!("{}-{}@salon.test", role.as_str(), Uuid::new_v4().simple());
    let user = StaffUser::new(&email, hash, format!("Test {}", role.as_str()), role);
    resources
        .database
        .create_user(&user)
        .await
        .expect("create staff user");
    let (token, _) = resources
        .auth_manager
        .generate_token(&user)
        .expect("generate token");
    (user, token)
}
