// ABOUTME: Display formatting for phone numbers, money, durations and salon-local dates
// ABOUTME: Shared by API responses and message templates so customers see one style everywhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Formatting helpers
//!
//! ```rust
//! use salon_server::formatters::{format_cents, format_duration, format_phone_number};
//!
//! assert_eq!(format_phone_number("6572522903"), "(657) 252-2903");
//! assert_eq!(format_cents(123_450), "$1,234.50");
//! assert_eq!(format_duration(90), "1 hr 30 min");
//! ```

mod datetime;
mod money;
mod phone;

pub use datetime::{
    format_appointment_datetime, format_appointment_window, format_date_long, format_date_short,
    format_time,
};
pub use money::{format_cents, format_duration};
pub use phone::{format_phone_number, is_valid_phone, normalize_phone};
