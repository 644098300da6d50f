// ABOUTME: Currency and duration formatting
// ABOUTME: Money is integer cents rendered as US dollars; durations are whole minutes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Format cents as `$1,234.50`; negatives get a leading `-`
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let remainder = abs % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{remainder:02}")
}

/// Format minutes as `45 min`, `1 hr`, `1 hr 30 min` or `2 hrs 15 min`
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m} min"),
        (1, 0) => "1 hr".to_owned(),
        (1, m) => format!("1 hr {m} min"),
        (h, 0) => format!("{h} hrs"),
        (h, m) => format!("{h} hrs {m} min"),
    }
}
