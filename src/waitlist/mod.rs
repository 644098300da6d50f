// ABOUTME: Waitlist entries and time-bounded slot offers
// ABOUTME: Pure matching plus the service that issues, answers and expires offers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Entry selection for a freed slot
pub mod matching;
/// Offer workflow
pub mod service;

pub use matching::{best_match, find_matches, FreedSlot};
pub use service::{OfferResponse, WaitlistService};
