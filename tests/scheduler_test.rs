// ABOUTME: Integration tests for the background jobs
// ABOUTME: Reminders go out once per appointment; run_all reports every job's count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{at, fixed_now, seed_appointment, seed_customer, seed_pet, service_named};
use salon_server::database::{CustomerInput, NewCampaign, NewWaitlistEntry};
use salon_server::models::{
    AppointmentStatus, AudienceSegment, ContactPreference, NotificationChannel, PetSize, PetSpecies,
    TimePreference,
};
use salon_server::scheduler::{self, JobsSummary};
use salon_server::waitlist::FreedSlot;

#[tokio::test]
async fn test_reminders_cover_the_next_day_once() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;

    let tomorrow =
        seed_appointment(db, &owner, &pet, &bath, at(5, 7, 59), AppointmentStatus::Confirmed)
            .await;
    let pending =
        seed_appointment(db, &owner, &pet, &bath, at(4, 15, 0), AppointmentStatus::Pending).await;
    // Outside the window or in a state that gets no reminder
    seed_appointment(db, &owner, &pet, &bath, at(5, 8, 0), AppointmentStatus::Confirmed).await;
    seed_appointment(db, &owner, &pet, &bath, at(4, 16, 0), AppointmentStatus::Cancelled).await;
    seed_appointment(db, &owner, &pet, &bath, at(4, 7, 0), AppointmentStatus::Confirmed).await;

    let sent = scheduler::send_due_reminders(&ctx.resources, fixed_now())
        .await
        .unwrap();
    assert_eq!(sent, 2);
    for id in [tomorrow.id, pending.id] {
        let appointment = db.get_appointment(id).await.unwrap().unwrap();
        assert!(appointment.reminder_sent_at.is_some());
    }
    let texts = ctx.sms.sent().await;
    assert_eq!(texts.len(), 2);
    assert!(texts.iter().all(|t| t.body.contains("Mochi")));

    let again = scheduler::send_due_reminders(&ctx.resources, at(4, 9, 0))
        .await
        .unwrap();
    assert_eq!(again, 0);
    assert_eq!(ctx.sms.sent().await.len(), 2);
}

#[tokio::test]
async fn test_failed_reminder_is_retried_next_run() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Lena", false).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    let appointment =
        seed_appointment(db, &owner, &pet, &bath, at(4, 15, 0), AppointmentStatus::Confirmed)
            .await;

    ctx.sms.set_failing(true);
    ctx.email.set_failing(true);
    let sent = scheduler::send_due_reminders(&ctx.resources, fixed_now())
        .await
        .unwrap();
    assert_eq!(sent, 0);
    let stored = db.get_appointment(appointment.id).await.unwrap().unwrap();
    assert!(stored.reminder_sent_at.is_none());

    ctx.sms.set_failing(false);
    ctx.email.set_failing(false);
    let sent = scheduler::send_due_reminders(&ctx.resources, at(4, 8, 15))
        .await
        .unwrap();
    assert_eq!(sent, 1);
    let stored = db.get_appointment(appointment.id).await.unwrap().unwrap();
    assert!(stored.reminder_sent_at.is_some());
}

#[tokio::test]
async fn test_unreachable_customer_is_not_counted_or_retried() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = db
        .create_customer(&CustomerInput {
            first_name: "Quinn".to_owned(),
            last_name: "Tester".to_owned(),
            email: None,
            phone: Some("+16572522903".to_owned()),
            preferred_channel: ContactPreference::Sms,
            sms_opt_in: false,
            email_opt_in: false,
            marketing_opt_in: false,
            notes: None,
        })
        .await
        .unwrap();
    let pet = seed_pet(db, owner.id, "Pip", PetSpecies::Cat, PetSize::Small).await;
    let appointment =
        seed_appointment(db, &owner, &pet, &bath, at(4, 15, 0), AppointmentStatus::Confirmed)
            .await;

    let sent = scheduler::send_due_reminders(&ctx.resources, fixed_now())
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert!(ctx.sms.sent().await.is_empty());
    let stored = db.get_appointment(appointment.id).await.unwrap().unwrap();
    assert!(stored.reminder_sent_at.is_some());
}

#[tokio::test]
async fn test_run_all_reports_each_job() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;

    let owner = seed_customer(db, "Lena", true).await;
    let pet = seed_pet(db, owner.id, "Mochi", PetSpecies::Dog, PetSize::Small).await;
    seed_appointment(db, &owner, &pet, &bath, at(4, 13, 0), AppointmentStatus::Confirmed)
        .await;

    let hopeful = seed_customer(db, "Omar", false).await;
    let hopeful_pet = seed_pet(db, hopeful.id, "Juno", PetSpecies::Dog, PetSize::Large).await;
    ctx.resources
        .waitlist
        .join(&NewWaitlistEntry {
            customer_id: hopeful.id,
            pet_id: hopeful_pet.id,
            service_id: bath.id,
            requested_date: at(5, 0, 0).date(),
            time_preference: TimePreference::Any,
            priority: 0,
            notes: None,
        })
        .await
        .unwrap();
    let offer = ctx
        .resources
        .waitlist
        .offer_slot(
            &FreedSlot {
                service_id: bath.id,
                start: at(5, 14, 0),
            },
            at(4, 6, 0),
        )
        .await
        .unwrap()
        .expect("offer made");
    assert_eq!(offer.expires_at, at(4, 8, 0));

    let campaigns = &ctx.resources.campaigns;
    let campaign = campaigns
        .create(&NewCampaign {
            name: "Weekday special".to_owned(),
            channel: NotificationChannel::Sms,
            subject: None,
            body: "Hi {{first_name}}, weekday baths are 10% off".to_owned(),
            segment: AudienceSegment::All,
        })
        .await
        .unwrap();
    campaigns
        .schedule(campaign.id, at(4, 7, 30), at(4, 6, 0))
        .await
        .unwrap();

    let summary = scheduler::run_all(&ctx.resources, fixed_now()).await;
    assert_eq!(
        summary,
        JobsSummary {
            reminders: 1,
            expired_offers: 1,
            campaigns: 1,
        }
    );

    let idle = scheduler::run_all(&ctx.resources, at(4, 8, 5)).await;
    assert_eq!(idle, JobsSummary::default());
}
