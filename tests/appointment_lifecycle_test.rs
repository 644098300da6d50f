// ABOUTME: Integration tests for appointment status changes and rescheduling
// ABOUTME: Checks the transition table, confirmations, customer updates and freed-slot hand-off
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{at, fixed_now, seed_appointment, seed_customer, seed_pet, service_named};
use salon_server::appointments::StatusChangeRequest;
use salon_server::database::NewWaitlistEntry;
use salon_server::errors::ErrorCode;
use salon_server::models::{
    AppointmentStatus, NotificationKind, PetSize, PetSpecies, TimePreference, WaitlistStatus,
};

fn to(status: AppointmentStatus) -> StatusChangeRequest<'static> {
    StatusChangeRequest {
        to: status,
        confirmed: false,
        reason: None,
        actor: Some("frontdesk@salon.test"),
    }
}

#[tokio::test]
async fn test_confirming_notifies_customer() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Cat, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 9, 0), AppointmentStatus::Pending).await;

    let change = ctx
        .resources
        .appointments
        .change_status(appt.id, to(AppointmentStatus::Confirmed), fixed_now())
        .await
        .unwrap();

    assert_eq!(change.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(change.notifications.len(), 1);
    assert_eq!(change.notifications[0].kind, NotificationKind::StatusUpdate);
    assert!(change.waitlist_offer_id.is_none());
    let texts = ctx.sms.sent().await;
    assert!(texts[0].body.contains("Mochi's Bath & Brush"));
}

#[tokio::test]
async fn test_grooming_day_runs_to_completion() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let groom = service_named(db, "Full Groom").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &groom, at(5, 9, 0), AppointmentStatus::Confirmed)
            .await;
    let service = &ctx.resources.appointments;

    for status in [AppointmentStatus::CheckedIn, AppointmentStatus::InProgress] {
        let change = service
            .change_status(appt.id, to(status), at(5, 9, 0))
            .await
            .unwrap();
        assert_eq!(change.appointment.status, status);
        assert!(change.notifications.is_empty());
    }

    let done = service
        .change_status(appt.id, to(AppointmentStatus::Completed), at(5, 10, 30))
        .await
        .unwrap();
    assert_eq!(done.appointment.status, AppointmentStatus::Completed);
    let texts = ctx.sms.sent().await;
    assert_eq!(texts.len(), 1);
    assert!(texts[0].body.contains("Ready for pickup"));

    let err = service
        .change_status(appt.id, to(AppointmentStatus::Cancelled), at(5, 11, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
}

#[tokio::test]
async fn test_cancel_requires_confirmation_and_keeps_reason() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 9, 0), AppointmentStatus::Confirmed)
            .await;

    let err = ctx
        .resources
        .appointments
        .change_status(appt.id, to(AppointmentStatus::Cancelled), fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfirmationRequired);
    let unchanged = db.get_appointment(appt.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, AppointmentStatus::Confirmed);

    let change = ctx
        .resources
        .appointments
        .change_status(
            appt.id,
            StatusChangeRequest {
                to: AppointmentStatus::Cancelled,
                confirmed: true,
                reason: Some("  Groomer out sick  "),
                actor: None,
            },
            fixed_now(),
        )
        .await
        .unwrap();
    assert_eq!(
        change.appointment.cancellation_reason.as_deref(),
        Some("Groomer out sick")
    );
    let texts = ctx.sms.sent().await;
    assert!(texts[0].body.contains("Reason: Groomer out sick."));
}

#[tokio::test]
async fn test_cancellation_offers_slot_to_waitlist() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 10, 0), AppointmentStatus::Confirmed)
            .await;

    let hopeful = common::seed_email_customer(db, "Omar").await;
    let hopeful_pet = seed_pet(db, hopeful.id, "Juno", PetSpecies::Dog, PetSize::Large).await;
    let entry = ctx
        .resources
        .waitlist
        .join(&NewWaitlistEntry {
            customer_id: hopeful.id,
            pet_id: hopeful_pet.id,
            service_id: bath.id,
            requested_date: at(5, 0, 0).date(),
            time_preference: TimePreference::Morning,
            priority: 0,
            notes: None,
        })
        .await
        .unwrap();

    let change = ctx
        .resources
        .appointments
        .change_status(
            appt.id,
            StatusChangeRequest {
                to: AppointmentStatus::Cancelled,
                confirmed: true,
                reason: None,
                actor: None,
            },
            fixed_now(),
        )
        .await
        .unwrap();

    let offer_id = change.waitlist_offer_id.expect("slot offered");
    let offer = db.get_offer(offer_id).await.unwrap().unwrap();
    assert_eq!(offer.waitlist_entry_id, entry.id);
    assert_eq!(offer.slot_start, at(5, 10, 0));

    let entry = db.get_waitlist_entry(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, WaitlistStatus::Offered);
    assert_eq!(entry.notification_attempts, 1);

    // Omar has no phone, so the offer goes by email
    let emails = ctx.email.sent().await;
    assert_eq!(emails.len(), 1);
    assert!(emails[0].body.contains(&offer.response_token));
}

#[tokio::test]
async fn test_past_no_show_does_not_reach_waitlist() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(4, 9, 0), AppointmentStatus::Confirmed)
            .await;

    let change = ctx
        .resources
        .appointments
        .change_status(
            appt.id,
            StatusChangeRequest {
                to: AppointmentStatus::NoShow,
                confirmed: true,
                reason: Some("ignored for no-shows"),
                actor: None,
            },
            at(4, 9, 30),
        )
        .await
        .unwrap();
    assert_eq!(change.appointment.status, AppointmentStatus::NoShow);
    assert!(change.appointment.cancellation_reason.is_none());
    assert!(change.waitlist_offer_id.is_none());
    assert!(change.notifications.is_empty());
}

#[tokio::test]
async fn test_reschedule_rules() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 10, 0), AppointmentStatus::Pending).await;
    let service = &ctx.resources.appointments;

    // Staff rules: an hour from now is fine
    let moved = service
        .reschedule(appt.id, at(4, 9, 0), fixed_now())
        .await
        .unwrap();
    assert_eq!(moved.scheduled_at, at(4, 9, 0));
    assert_eq!(moved.status, AppointmentStatus::Pending);

    // Sunday is closed
    let err = service
        .reschedule(appt.id, at(10, 10, 0), fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SlotUnavailable);

    // Two chairs already busy at 14:00 Wednesday
    for _ in 0..2 {
        seed_appointment(db, &owner, &pet, &bath, at(6, 14, 0), AppointmentStatus::Confirmed)
            .await;
    }
    let err = service
        .reschedule(appt.id, at(6, 14, 30), fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SlotUnavailable);

    let checked_in =
        seed_appointment(db, &owner, &pet, &bath, at(4, 8, 0), AppointmentStatus::CheckedIn)
            .await;
    let err = service
        .reschedule(checked_in.id, at(4, 12, 0), fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
}

#[tokio::test]
async fn test_concurrent_changes_from_one_state_cannot_both_apply() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 9, 0), AppointmentStatus::CheckedIn)
            .await;
    let service = &ctx.resources.appointments;

    let cancel = StatusChangeRequest {
        confirmed: true,
        reason: Some("Owner left"),
        ..to(AppointmentStatus::Cancelled)
    };
    let (cancelled, started) = tokio::join!(
        service.change_status(appt.id, cancel, at(5, 9, 5)),
        service.change_status(appt.id, to(AppointmentStatus::InProgress), at(5, 9, 5)),
    );

    assert!(
        cancelled.is_ok() ^ started.is_ok(),
        "exactly one change may win"
    );
    let (winner, loser) = match (cancelled, started) {
        (Ok(win), Err(lose)) | (Err(lose), Ok(win)) => (win, lose),
        _ => unreachable!(),
    };
    assert!(matches!(
        loser.code,
        ErrorCode::ResourceLocked | ErrorCode::InvalidStatusTransition
    ));
    let stored = db.get_appointment(appt.id).await.unwrap().unwrap();
    assert_eq!(stored.status, winner.appointment.status);
}

#[tokio::test]
async fn test_stale_status_write_is_locked() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appt =
        seed_appointment(db, &owner, &pet, &bath, at(5, 9, 0), AppointmentStatus::Cancelled)
            .await;

    // Written as if the appointment were still checked in
    let err = db
        .update_appointment_status(
            appt.id,
            AppointmentStatus::CheckedIn,
            AppointmentStatus::InProgress,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    let stored = db.get_appointment(appt.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
    assert!(ctx.sms.sent().await.is_empty());

    let err = db
        .update_appointment_status(
            uuid::Uuid::new_v4(),
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
