// ABOUTME: Integration tests for post-visit report cards
// ABOUTME: Covers completion gating, one card per visit and delivery stamping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{at, seed_appointment, seed_customer, seed_pet, service_named, TestContext};
use salon_server::database::{CustomerInput, NewReportCard};
use salon_server::errors::ErrorCode;
use salon_server::models::{
    Appointment, AppointmentStatus, ContactPreference, DeliveryStatus, NotificationKind, PetSize,
    PetSpecies,
};
use uuid::Uuid;

fn card_for(appointment_id: Uuid) -> NewReportCard {
    NewReportCard {
        appointment_id,
        groomer_notes: "Calm on the table, loved the blow-dry.".to_owned(),
        behavior_rating: 5,
        coat_condition: Some("Light matting behind the ears".to_owned()),
        photo_urls: vec!["https://photos.salon.test/biscuit-after.jpg".to_owned()],
        recommendations: Some("Brush twice a week".to_owned()),
        next_visit_weeks: Some(6),
    }
}

async fn visit(ctx: &TestContext, status: AppointmentStatus) -> Appointment {
    let db = ctx.database();
    let groom = service_named(db, "Full Groom").await;
    let owner = seed_customer(db, "Maya", false).await;
    let pet = seed_pet(db, owner.id, "Biscuit", PetSpecies::Dog, PetSize::Medium).await;
    seed_appointment(db, &owner, &pet, &groom, at(4, 9, 0), status).await
}

#[tokio::test]
async fn test_card_needs_a_completed_visit() {
    let ctx = common::create_test_context().await;
    let appointment = visit(&ctx, AppointmentStatus::InProgress).await;

    let err = ctx
        .resources
        .report_cards
        .create(&card_for(appointment.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = ctx
        .resources
        .report_cards
        .create(&card_for(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_rating_and_photos_are_validated() {
    let ctx = common::create_test_context().await;
    let appointment = visit(&ctx, AppointmentStatus::Completed).await;

    let mut card = card_for(appointment.id);
    card.behavior_rating = 6;
    let err = ctx.resources.report_cards.create(&card).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("behavior_rating"));

    let mut card = card_for(appointment.id);
    card.photo_urls = vec!["file:///tmp/biscuit.jpg".to_owned()];
    let err = ctx.resources.report_cards.create(&card).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_one_card_per_visit() {
    let ctx = common::create_test_context().await;
    let appointment = visit(&ctx, AppointmentStatus::Completed).await;
    let cards = &ctx.resources.report_cards;

    let card = cards.create(&card_for(appointment.id)).await.unwrap();
    assert_eq!(card.behavior_rating, 5);
    assert!(card.sent_at.is_none());

    let err = cards.create(&card_for(appointment.id)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_sending_delivers_and_stamps() {
    let ctx = common::create_test_context().await;
    let appointment = visit(&ctx, AppointmentStatus::Completed).await;
    let cards = &ctx.resources.report_cards;
    let card = cards.create(&card_for(appointment.id)).await.unwrap();

    let delivery = cards.send(card.id).await.unwrap();
    assert!(delivery.report_card.sent_at.is_some());
    assert_eq!(delivery.notifications.len(), 1);
    assert_eq!(delivery.notifications[0].kind, NotificationKind::ReportCard);
    assert_eq!(delivery.notifications[0].appointment_id, Some(appointment.id));

    let texts = ctx.sms.sent().await;
    let body = &texts[0].body;
    assert!(body.contains("Biscuit's report card"));
    assert!(body.contains("Behavior: 5/5"));
    assert!(body.contains("Brush twice a week"));
    assert!(body.contains("https://photos.salon.test/biscuit-after.jpg"));
}

#[tokio::test]
async fn test_unreachable_owner_leaves_card_unsent() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let groom = service_named(db, "Full Groom").await;
    let owner = db
        .create_customer(&CustomerInput {
            first_name: "Quinn".to_owned(),
            last_name: "Hale".to_owned(),
            email: Some("quinn@example.com".to_owned()),
            phone: None,
            preferred_channel: ContactPreference::Email,
            sms_opt_in: false,
            email_opt_in: false,
            marketing_opt_in: false,
            notes: None,
        })
        .await
        .unwrap();
    let pet = seed_pet(db, owner.id, "Pixel", PetSpecies::Cat, PetSize::Small).await;
    let appointment =
        seed_appointment(db, &owner, &pet, &groom, at(4, 9, 0), AppointmentStatus::Completed)
            .await;

    let cards = &ctx.resources.report_cards;
    let card = cards.create(&card_for(appointment.id)).await.unwrap();
    let delivery = cards.send(card.id).await.unwrap();

    assert!(delivery.report_card.sent_at.is_none());
    assert_eq!(delivery.notifications[0].status, DeliveryStatus::Skipped);
    assert!(ctx.email.sent().await.is_empty());
}
