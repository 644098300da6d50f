// ABOUTME: System-wide constants re-exported from salon-core
// ABOUTME: Scheduling defaults, waitlist limits, provider endpoints and input limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

pub use salon_core::constants::*;
