// ABOUTME: Integration tests for the waitlist: matching a freed slot, responding, expiry and cascade
// ABOUTME: Uses a fixed salon clock so offer deadlines are deterministic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    at, fixed_now, seed_appointment, seed_customer, seed_pet, service_named, TestContext,
};
use salon_server::database::NewWaitlistEntry;
use salon_server::errors::ErrorCode;
use salon_server::models::{
    AppointmentStatus, BookingSource, GroomingService, OfferStatus, PetSize, PetSpecies,
    TimePreference, WaitlistEntry, WaitlistStatus,
};
use salon_server::waitlist::FreedSlot;

struct Scenario {
    ctx: TestContext,
    bath: GroomingService,
    /// Priority 5, asked for the day after the slot
    vip: WaitlistEntry,
    /// Priority 0, asked for the slot's day
    regular: WaitlistEntry,
}

impl Scenario {
    async fn new() -> Self {
        let ctx = common::create_test_context().await;
        let bath = service_named(ctx.database(), "Bath & Brush").await;
        let vip = join(&ctx, &bath, "Vera", 6, 5).await;
        let regular = join(&ctx, &bath, "Rudy", 5, 0).await;
        Self {
            ctx,
            bath,
            vip,
            regular,
        }
    }

    fn slot(&self) -> FreedSlot {
        FreedSlot {
            service_id: self.bath.id,
            start: at(5, 10, 0),
        }
    }

    async fn entry(&self, entry: &WaitlistEntry) -> WaitlistEntry {
        self.ctx
            .database()
            .get_waitlist_entry(entry.id)
            .await
            .unwrap()
            .unwrap()
    }
}

async fn join(
    ctx: &TestContext,
    service: &GroomingService,
    name: &str,
    day: u32,
    priority: i32,
) -> WaitlistEntry {
    let db = ctx.database();
    let customer = seed_customer(db, name, false).await;
    let pet = seed_pet(db, customer.id, "Scout", PetSpecies::Dog, PetSize::Large).await;
    ctx.resources
        .waitlist
        .join(&NewWaitlistEntry {
            customer_id: customer.id,
            pet_id: pet.id,
            service_id: service.id,
            requested_date: at(day, 0, 0).date(),
            time_preference: TimePreference::Any,
            priority,
            notes: Some("Any groomer".to_owned()),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_offer_goes_to_highest_priority_with_deadline() {
    let s = Scenario::new().await;
    let offer = s
        .ctx
        .resources
        .waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .expect("a match");

    assert_eq!(offer.waitlist_entry_id, s.vip.id);
    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.duration_minutes, 60);
    // Two hours from 08:00
    assert_eq!(offer.expires_at, at(4, 10, 0));
    assert_eq!(s.entry(&s.vip).await.status, WaitlistStatus::Offered);
    assert_eq!(s.entry(&s.regular).await.status, WaitlistStatus::Active);

    let texts = s.ctx.sms.sent().await;
    assert_eq!(texts.len(), 1);
    assert!(texts[0].body.contains(&format!("/waitlist/offers/{}", offer.id)));
}

#[tokio::test]
async fn test_deadline_never_passes_slot_start() {
    let s = Scenario::new().await;
    let db = s.ctx.database();
    let mut settings = db.load_business_settings().await.unwrap();
    settings.offer_deadline_hours = 6;
    db.save_business_settings(&settings).await.unwrap();

    let slot = FreedSlot {
        service_id: s.bath.id,
        start: at(4, 11, 0),
    };
    let offer = s
        .ctx
        .resources
        .waitlist
        .offer_slot(&slot, fixed_now())
        .await
        .unwrap()
        .expect("a match");
    assert_eq!(offer.expires_at, at(4, 11, 0));
}

#[tokio::test]
async fn test_accepting_books_the_slot() {
    let s = Scenario::new().await;
    let waitlist = &s.ctx.resources.waitlist;
    let offer = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();

    let err = waitlist
        .respond(offer.id, "not-the-token", true, at(4, 8, 30))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    let response = waitlist
        .respond(offer.id, &offer.response_token, true, at(4, 8, 30))
        .await
        .unwrap();
    let appointment = response.appointment.expect("booked");
    assert_eq!(appointment.scheduled_at, at(5, 10, 0));
    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(appointment.source, BookingSource::Waitlist);
    assert_eq!(appointment.total_price_cents, s.bath.price_large_cents);
    assert_eq!(appointment.notes.as_deref(), Some("Any groomer"));
    assert_eq!(response.offer.status, OfferStatus::Accepted);
    assert_eq!(response.offer.appointment_id, Some(appointment.id));
    assert_eq!(s.entry(&s.vip).await.status, WaitlistStatus::Booked);

    // Offer text plus booking confirmation
    assert_eq!(s.ctx.sms.sent().await.len(), 2);

    let err = waitlist
        .respond(offer.id, &offer.response_token, true, at(4, 8, 45))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OfferClosed);
}

#[tokio::test]
async fn test_declining_cascades_to_next_match() {
    let s = Scenario::new().await;
    let waitlist = &s.ctx.resources.waitlist;
    let first = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();

    let response = waitlist
        .respond(first.id, &first.response_token, false, at(4, 8, 30))
        .await
        .unwrap();
    assert_eq!(response.offer.status, OfferStatus::Declined);
    assert!(response.appointment.is_none());
    let next = response.next_offer.expect("cascaded");
    assert_eq!(next.waitlist_entry_id, s.regular.id);

    let vip = s.entry(&s.vip).await;
    assert_eq!(vip.status, WaitlistStatus::Active);
    assert_eq!(vip.notification_attempts, 1);

    // The VIP already passed on this slot, so nobody is left
    let response = waitlist
        .respond(next.id, &next.response_token, false, at(4, 8, 40))
        .await
        .unwrap();
    assert!(response.next_offer.is_none());
}

#[tokio::test]
async fn test_expiry_job_closes_and_cascades() {
    let s = Scenario::new().await;
    let waitlist = &s.ctx.resources.waitlist;
    let offer = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(waitlist.expire_offers(at(4, 9, 59)).await.unwrap(), 0);

    let err = waitlist
        .respond(offer.id, &offer.response_token, true, at(4, 10, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OfferExpired);

    assert_eq!(waitlist.expire_offers(at(4, 10, 0)).await.unwrap(), 1);
    let closed = s.ctx.database().get_offer(offer.id).await.unwrap().unwrap();
    assert_eq!(closed.status, OfferStatus::Expired);
    assert_eq!(s.entry(&s.regular).await.status, WaitlistStatus::Offered);
    assert_eq!(waitlist.expire_offers(at(4, 10, 5)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_entry_expires_after_last_attempt() {
    let s = Scenario::new().await;
    let db = s.ctx.database();
    let mut settings = db.load_business_settings().await.unwrap();
    settings.max_offer_attempts = 1;
    db.save_business_settings(&settings).await.unwrap();

    let waitlist = &s.ctx.resources.waitlist;
    let offer = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();
    waitlist
        .respond(offer.id, &offer.response_token, false, at(4, 8, 30))
        .await
        .unwrap();
    assert_eq!(s.entry(&s.vip).await.status, WaitlistStatus::Expired);
}

#[tokio::test]
async fn test_accept_fails_when_slot_was_taken() {
    let s = Scenario::new().await;
    let db = s.ctx.database();
    let waitlist = &s.ctx.resources.waitlist;
    let offer = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();

    let walk_up = seed_customer(db, "Walt", false).await;
    let pet = seed_pet(db, walk_up.id, "Ace", PetSpecies::Dog, PetSize::Small).await;
    for _ in 0..2 {
        seed_appointment(db, &walk_up, &pet, &s.bath, at(5, 10, 0), AppointmentStatus::Confirmed)
            .await;
    }

    let err = waitlist
        .respond(offer.id, &offer.response_token, true, at(4, 8, 30))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SlotUnavailable);
    let closed = db.get_offer(offer.id).await.unwrap().unwrap();
    assert_eq!(closed.status, OfferStatus::Expired);
    assert_eq!(s.entry(&s.vip).await.status, WaitlistStatus::Active);
}

#[tokio::test]
async fn test_no_offer_for_a_slot_that_is_still_full() {
    let s = Scenario::new().await;
    let db = s.ctx.database();
    let owner = seed_customer(db, "Owen", false).await;
    let pet = seed_pet(db, owner.id, "Ace", PetSpecies::Dog, PetSize::Small).await;
    for _ in 0..2 {
        seed_appointment(db, &owner, &pet, &s.bath, at(5, 10, 0), AppointmentStatus::Confirmed)
            .await;
    }
    let offer = s
        .ctx
        .resources
        .waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap();
    assert!(offer.is_none());
}

#[tokio::test]
async fn test_cancelling_entry_passes_pending_offer_on() {
    let s = Scenario::new().await;
    let waitlist = &s.ctx.resources.waitlist;
    let offer = waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .unwrap();

    let cancelled = waitlist.cancel(s.vip.id, at(4, 8, 15)).await.unwrap();
    assert_eq!(cancelled.status, WaitlistStatus::Cancelled);
    let closed = s.ctx.database().get_offer(offer.id).await.unwrap().unwrap();
    assert_eq!(closed.status, OfferStatus::Declined);
    assert_eq!(s.entry(&s.regular).await.status, WaitlistStatus::Offered);

    let err = waitlist.cancel(s.vip.id, at(4, 8, 20)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
}

#[tokio::test]
async fn test_join_rejects_someone_elses_pet() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;
    let owner = seed_customer(db, "Owen", false).await;
    let other = seed_customer(db, "Olga", false).await;
    let pet = seed_pet(db, owner.id, "Ace", PetSpecies::Dog, PetSize::Small).await;

    let err = ctx
        .resources
        .waitlist
        .join(&NewWaitlistEntry {
            customer_id: other.id,
            pet_id: pet.id,
            service_id: bath.id,
            requested_date: at(5, 0, 0).date(),
            time_preference: TimePreference::Afternoon,
            priority: 0,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_offer_claim_needs_an_active_entry() {
    let s = Scenario::new().await;
    let db = s.ctx.database();
    db.update_waitlist_status(s.vip.id, WaitlistStatus::Offered)
        .await
        .unwrap();

    let claimed = db
        .record_waitlist_offer(s.vip.id, chrono::Utc::now())
        .await
        .unwrap();
    assert!(!claimed);
    assert_eq!(s.entry(&s.vip).await.notification_attempts, 0);

    // The taken entry is passed over for the next match
    let offer = s
        .ctx
        .resources
        .waitlist
        .offer_slot(&s.slot(), fixed_now())
        .await
        .unwrap()
        .expect("a match");
    assert_eq!(offer.waitlist_entry_id, s.regular.id);
}

#[tokio::test]
async fn test_simultaneous_offers_never_share_an_entry() {
    let s = Scenario::new().await;
    let waitlist = &s.ctx.resources.waitlist;
    let later = FreedSlot {
        service_id: s.bath.id,
        start: at(5, 13, 0),
    };
    let slot = s.slot();

    let (first, second) = tokio::join!(
        waitlist.offer_slot(&slot, fixed_now()),
        waitlist.offer_slot(&later, fixed_now()),
    );
    let first = first.unwrap().expect("a match");
    let second = second.unwrap().expect("a match");
    assert_ne!(first.waitlist_entry_id, second.waitlist_entry_id);

    for entry in [&s.vip, &s.regular] {
        let offers = s.ctx.database().offers_for_entry(entry.id).await.unwrap();
        let pending = offers
            .iter()
            .filter(|o| o.status == OfferStatus::Pending)
            .count();
        assert_eq!(pending, 1);
        let stored = s.entry(entry).await;
        assert_eq!(stored.status, WaitlistStatus::Offered);
        assert_eq!(stored.notification_attempts, 1);
    }
}
