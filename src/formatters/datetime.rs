// ABOUTME: Salon-local date and time display
// ABOUTME: 12-hour clock without leading zeros, US month/day ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// `Tuesday, March 4, 2025`
#[must_use]
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `Tue, Mar 4`
#[must_use]
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// `2:30 PM`
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// `Tuesday, March 4, 2025 at 2:30 PM`
#[must_use]
pub fn format_appointment_datetime(at: NaiveDateTime) -> String {
    format!("{} at {}", format_date_long(at.date()), format_time(at.time()))
}

/// `2:30 PM – 4:00 PM`
#[must_use]
pub fn format_appointment_window(start: NaiveDateTime, duration_minutes: u32) -> String {
    let end = start + Duration::minutes(i64::from(duration_minutes));
    format!("{} \u{2013} {}", format_time(start.time()), format_time(end.time()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn march_4(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(format_date_long(date), "Tuesday, March 4, 2025");
        assert_eq!(format_date_short(date), "Tue, Mar 4");
    }

    #[test]
    fn test_times() {
        assert_eq!(format_time(march_4(14, 30).time()), "2:30 PM");
        assert_eq!(format_time(march_4(9, 5).time()), "9:05 AM");
        assert_eq!(format_time(march_4(12, 0).time()), "12:00 PM");
        assert_eq!(format_appointment_window(march_4(14, 30), 90), "2:30 PM \u{2013} 4:00 PM");
        assert_eq!(
            format_appointment_datetime(march_4(9, 0)),
            "Tuesday, March 4, 2025 at 9:00 AM"
        );
    }
}
