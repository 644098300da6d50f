// ABOUTME: Waitlist matching for a freed appointment slot
// ABOUTME: Filters by service, date window, time preference and attempts; ranks by priority then closeness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::models::{BusinessSettings, WaitlistEntry, WaitlistStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use uuid::Uuid;

/// A slot that just opened up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreedSlot {
    /// Service the slot was booked for
    pub service_id: Uuid,
    /// Salon-local start
    pub start: NaiveDateTime,
}

fn day_distance(entry: &WaitlistEntry, slot: &FreedSlot) -> i64 {
    (entry.requested_date - slot.start.date()).num_days().abs()
}

fn is_candidate(entry: &WaitlistEntry, slot: &FreedSlot, settings: &BusinessSettings) -> bool {
    entry.status == WaitlistStatus::Active
        && entry.service_id == slot.service_id
        && day_distance(entry, slot) <= i64::from(settings.waitlist_window_days)
        && entry.time_preference.accepts(slot.start.time())
        && entry.notification_attempts < settings.max_offer_attempts
}

/// Entries that could take `slot`, best first
///
/// Order: priority (high first), distance from the requested date, then
/// who joined first.
#[must_use]
pub fn find_matches<'a>(
    entries: &'a [WaitlistEntry],
    slot: &FreedSlot,
    settings: &BusinessSettings,
) -> Vec<&'a WaitlistEntry> {
    let mut matches: Vec<&WaitlistEntry> = entries
        .iter()
        .filter(|entry| is_candidate(entry, slot, settings))
        .collect();
    matches.sort_by_key(|entry| {
        (
            Reverse(entry.priority),
            day_distance(entry, slot),
            entry.created_at,
        )
    });
    matches
}

/// The first of [`find_matches`]
#[must_use]
pub fn best_match<'a>(
    entries: &'a [WaitlistEntry],
    slot: &FreedSlot,
    settings: &BusinessSettings,
) -> Option<&'a WaitlistEntry> {
    find_matches(entries, slot, settings).into_iter().next()
}
