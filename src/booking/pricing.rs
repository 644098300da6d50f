// ABOUTME: Price and duration quote for a service, pet size and add-ons
// ABOUTME: Rejects unknown or inactive add-ons so stored totals always match the catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::errors::{AppError, AppResult};
use crate::models::{Addon, GroomingService, PetSize};
use serde::Serialize;
use uuid::Uuid;

/// Priced booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Service price for the pet's size
    pub base_cents: i64,
    /// Sum of add-on prices
    pub addons_cents: i64,
    /// Total
    pub total_cents: i64,
    /// Service plus add-on minutes
    pub duration_minutes: u32,
}

/// Price `service` for a pet of `size` with the requested add-ons
///
/// `catalog` is the set of add-ons loaded for `addon_ids`; duplicate ids count once.
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the service is inactive or an add-on is
/// unknown or inactive
pub fn quote(
    service: &GroomingService,
    size: PetSize,
    addon_ids: &[Uuid],
    catalog: &[Addon],
) -> AppResult<Quote> {
    if !service.is_active {
        return Err(AppError::invalid_input(format!(
            "{} is not currently offered",
            service.name
        )));
    }

    let mut seen: Vec<Uuid> = Vec::with_capacity(addon_ids.len());
    let mut addons_cents = 0_i64;
    let mut addon_minutes = 0_u32;
    for id in addon_ids {
        if seen.contains(id) {
            continue;
        }
        seen.push(*id);
        let addon = catalog
            .iter()
            .find(|a| a.id == *id)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown add-on {id}")))?;
        if !addon.is_active {
            return Err(AppError::invalid_input(format!(
                "{} is not currently offered",
                addon.name
            )));
        }
        addons_cents += addon.price_cents;
        addon_minutes += addon.duration_minutes;
    }

    let base_cents = service.price_for(size);
    Ok(Quote {
        base_cents,
        addons_cents,
        total_cents: base_cents + addons_cents,
        duration_minutes: service.duration_minutes + addon_minutes,
    })
}
