// ABOUTME: Domain models re-exported from salon-core
// ABOUTME: Customers, pets, catalog, appointments, waitlist, notifications, campaigns and settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

pub use salon_core::models::*;
