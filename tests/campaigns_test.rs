// ABOUTME: Integration tests for marketing campaigns: audience preview, dispatch and scheduling
// ABOUTME: Checks consent filtering, placeholder rendering and the send-once guarantee
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{at, fixed_now, seed_appointment, seed_customer, seed_pet, service_named, TestContext};
use salon_server::database::{CampaignUpdate, NewCampaign};
use salon_server::errors::ErrorCode;
use salon_server::models::{
    AppointmentStatus, AudienceSegment, Campaign, CampaignStatus, NotificationChannel, PetSize,
    PetSpecies,
};

fn sms_campaign(segment: AudienceSegment) -> NewCampaign {
    NewCampaign {
        name: "Spring shed-out".to_owned(),
        channel: NotificationChannel::Sms,
        subject: None,
        body: "Hi {{first_name}}, {{pet_name}} is due for a de-shed! Book at {{booking_url}}"
            .to_owned(),
        segment,
    }
}

/// Two dog owners (one without marketing consent) and a cat owner
async fn seed_audience(ctx: &TestContext) {
    let db = ctx.database();
    let dana = seed_customer(db, "Dana", true).await;
    seed_pet(db, dana.id, "Biscuit", PetSpecies::Dog, PetSize::Large).await;
    let ned = seed_customer(db, "Ned", false).await;
    seed_pet(db, ned.id, "Rex", PetSpecies::Dog, PetSize::Small).await;
    let cora = seed_customer(db, "Cora", true).await;
    seed_pet(db, cora.id, "Mochi", PetSpecies::Cat, PetSize::Small).await;
}

async fn create(ctx: &TestContext, new: &NewCampaign) -> Campaign {
    ctx.resources.campaigns.create(new).await.unwrap()
}

fn on(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

#[tokio::test]
async fn test_create_rejects_bad_content() {
    let ctx = common::create_test_context().await;
    let campaigns = &ctx.resources.campaigns;

    let mut unknown = sms_campaign(AudienceSegment::All);
    unknown.body = "Use code {{discount_code}}".to_owned();
    let err = campaigns.create(&unknown).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("discount_code"));

    let mut email = sms_campaign(AudienceSegment::All);
    email.channel = NotificationChannel::Email;
    let err = campaigns.create(&email).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("subject"));
}

#[tokio::test]
async fn test_preview_counts_matched_and_reachable() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    let campaign = create(
        &ctx,
        &sms_campaign(AudienceSegment::Species {
            species: PetSpecies::Dog,
        }),
    )
    .await;

    let preview = ctx
        .resources
        .campaigns
        .preview_audience(campaign.id, fixed_now())
        .await
        .unwrap();
    assert_eq!(preview.matched, 2);
    assert_eq!(preview.reachable, 1);
    assert_eq!(preview.recipients[0].first_name, "Dana");
}

#[tokio::test]
async fn test_send_renders_and_is_not_repeatable() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    let campaigns = &ctx.resources.campaigns;
    let campaign = create(
        &ctx,
        &sms_campaign(AudienceSegment::Species {
            species: PetSpecies::Dog,
        }),
    )
    .await;

    let report = campaigns.send(campaign.id, fixed_now()).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 1);

    let texts = ctx.sms.sent().await;
    assert_eq!(texts.len(), 1);
    assert_eq!(
        texts[0].body,
        "Hi Dana, Biscuit is due for a de-shed! Book at http://localhost:8090/book"
    );

    let stored = ctx.database().get_campaign(campaign.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Sent);
    assert_eq!(stored.sent_count, 1);

    let err = campaigns.send(campaign.id, fixed_now()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    let err = campaigns
        .update(
            campaign.id,
            &CampaignUpdate {
                name: Some("Renamed".to_owned()),
                ..CampaignUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    assert_eq!(ctx.sms.sent().await.len(), 1);
}

#[tokio::test]
async fn test_provider_failures_are_counted() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    ctx.sms.set_failing(true);
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;

    let report = ctx
        .resources
        .campaigns
        .send(campaign.id, fixed_now())
        .await
        .unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.skipped, 1);

    let stored = ctx.database().get_campaign(campaign.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_count, 2);
}

#[tokio::test]
async fn test_lapsed_segment_uses_last_completed_visit() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let bath = service_named(db, "Bath & Brush").await;

    let old = seed_customer(db, "Olive", true).await;
    let old_pet = seed_pet(db, old.id, "Duke", PetSpecies::Dog, PetSize::Large).await;
    seed_appointment(db, &old, &old_pet, &bath, on(2029, 12, 3), AppointmentStatus::Completed)
        .await;

    let recent = seed_customer(db, "Remy", true).await;
    let recent_pet = seed_pet(db, recent.id, "Kiwi", PetSpecies::Dog, PetSize::Small).await;
    seed_appointment(db, &recent, &recent_pet, &bath, at(1, 10, 0), AppointmentStatus::Completed)
        .await;

    // Never visited: not lapsed
    seed_customer(db, "Nova", true).await;

    let campaign = create(&ctx, &sms_campaign(AudienceSegment::Lapsed { days: 60 })).await;
    let preview = ctx
        .resources
        .campaigns
        .preview_audience(campaign.id, fixed_now())
        .await
        .unwrap();
    assert_eq!(preview.matched, 1);
    assert_eq!(preview.recipients[0].id, old.id);
}

#[tokio::test]
async fn test_scheduled_campaign_goes_out_when_due() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    let campaigns = &ctx.resources.campaigns;
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;

    let err = campaigns
        .schedule(campaign.id, at(4, 7, 0), fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let scheduled = campaigns
        .schedule(campaign.id, at(5, 9, 0), fixed_now())
        .await
        .unwrap();
    assert_eq!(scheduled.status, CampaignStatus::Scheduled);
    assert_eq!(scheduled.scheduled_for, Some(at(5, 9, 0)));

    // Still editable while waiting
    let edited = campaigns
        .update(
            campaign.id,
            &CampaignUpdate {
                body: Some("Hello {{first_name}} from {{business_name}}".to_owned()),
                ..CampaignUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.status, CampaignStatus::Scheduled);

    assert_eq!(campaigns.dispatch_due(at(5, 8, 59)).await.unwrap(), 0);
    assert_eq!(campaigns.dispatch_due(at(5, 9, 0)).await.unwrap(), 1);
    assert_eq!(campaigns.dispatch_due(at(5, 9, 5)).await.unwrap(), 0);

    let texts = ctx.sms.sent().await;
    assert_eq!(texts.len(), 2);
    assert!(texts
        .iter()
        .any(|t| t.body == "Hello Dana from Pampered Paws Grooming"));
}

#[tokio::test]
async fn test_cancelled_campaign_cannot_be_sent() {
    let ctx = common::create_test_context().await;
    let campaigns = &ctx.resources.campaigns;
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;

    let cancelled = campaigns.cancel(campaign.id).await.unwrap();
    assert_eq!(cancelled.status, CampaignStatus::Cancelled);

    let err = campaigns.send(campaign.id, fixed_now()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    let err = campaigns.cancel(campaign.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
}

#[tokio::test]
async fn test_status_writes_do_not_override_a_running_send() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;

    // A dispatch holds the campaign
    assert!(db.claim_campaign_for_sending(campaign.id).await.unwrap());
    let err = db
        .set_campaign_status(campaign.id, CampaignStatus::Cancelled, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    let err = db
        .set_campaign_status(campaign.id, CampaignStatus::Scheduled, Some(at(5, 9, 0)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);
    let mut edited = campaign.clone();
    edited.name = "Renamed mid-send".to_owned();
    let err = db.save_campaign_content(&edited).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);

    let stored = db.get_campaign(campaign.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Sending);
    assert_eq!(stored.name, "Spring shed-out");
}

#[tokio::test]
async fn test_racing_cancel_and_send_agree_on_outcome() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    let campaigns = &ctx.resources.campaigns;
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;

    let (sent, cancelled) = tokio::join!(
        campaigns.send(campaign.id, fixed_now()),
        campaigns.cancel(campaign.id),
    );
    assert!(sent.is_ok() ^ cancelled.is_ok(), "exactly one may win");

    let stored = ctx.database().get_campaign(campaign.id).await.unwrap().unwrap();
    if sent.is_ok() {
        assert_eq!(stored.status, CampaignStatus::Sent);
        assert_eq!(cancelled.unwrap_err().code, ErrorCode::ResourceLocked);
    } else {
        assert_eq!(stored.status, CampaignStatus::Cancelled);
        assert_eq!(sent.unwrap_err().code, ErrorCode::ResourceLocked);
        assert!(ctx.sms.sent().await.is_empty());
    }
}

#[tokio::test]
async fn test_failed_audience_load_leaves_campaign_sendable() {
    let ctx = common::create_test_context().await;
    seed_audience(&ctx).await;
    let campaigns = &ctx.resources.campaigns;
    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;
    campaigns
        .schedule(campaign.id, at(5, 9, 0), fixed_now())
        .await
        .unwrap();

    sqlx::query("ALTER TABLE pets RENAME TO pets_offline")
        .execute(ctx.database().pool())
        .await
        .unwrap();
    assert!(campaigns.send(campaign.id, fixed_now()).await.is_err());
    let stored = ctx.database().get_campaign(campaign.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Scheduled);

    sqlx::query("ALTER TABLE pets_offline RENAME TO pets")
        .execute(ctx.database().pool())
        .await
        .unwrap();
    let report = campaigns.send(campaign.id, fixed_now()).await.unwrap();
    assert_eq!(report.sent, 2);
}

#[tokio::test]
async fn test_one_bad_recipient_does_not_stall_dispatch() {
    let ctx = common::create_test_context().await;
    let db = ctx.database();
    let dana = seed_customer(db, "Dana", true).await;
    seed_pet(db, dana.id, "Biscuit", PetSpecies::Dog, PetSize::Large).await;
    let cora = seed_customer(db, "Cora", true).await;
    seed_pet(db, cora.id, "Mochi", PetSpecies::Cat, PetSize::Small).await;

    // Cora's pet row no longer decodes
    sqlx::query("UPDATE pets SET created_at = 'not-a-timestamp' WHERE customer_id = ?1")
        .bind(cora.id.to_string())
        .execute(db.pool())
        .await
        .unwrap();

    let campaign = create(&ctx, &sms_campaign(AudienceSegment::All)).await;
    let report = ctx
        .resources
        .campaigns
        .send(campaign.id, fixed_now())
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);

    let stored = db.get_campaign(campaign.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Sent);
    assert_eq!(stored.failed_count, 1);
    let texts = ctx.sms.sent().await;
    assert!(texts[0].body.starts_with("Hi Dana"));
}
