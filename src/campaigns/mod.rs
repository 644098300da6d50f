// ABOUTME: Marketing campaigns with audience segments and consent-aware dispatch
// ABOUTME: Segment evaluation is pure; the service drives the campaign lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Audience segment evaluation
pub mod segments;
/// Campaign lifecycle and dispatch
pub mod service;

pub use segments::{marketing_address, SegmentMatch};
pub use service::{AudiencePreview, CampaignService, DispatchReport};
