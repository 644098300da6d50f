// ABOUTME: North American phone number display and E.164 normalization
// ABOUTME: Accepts any punctuation; ten digits, optionally prefixed by country code 1
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Ten-digit national number, or `None`
fn national_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_owned()),
        _ => None,
    }
}

/// Format a phone number as `(657) 252-2903`
///
/// Input that is not a ten-digit North American number is returned trimmed
/// and otherwise unchanged.
#[must_use]
pub fn format_phone_number(raw: &str) -> String {
    national_digits(raw).map_or_else(
        || raw.trim().to_owned(),
        |d| format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..]),
    )
}

/// E.164 form (`+16572522903`) for storage and SMS delivery
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    national_digits(raw).map(|d| format!("+1{d}"))
}

/// Whether the input can be normalized
#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    national_digits(raw).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("6572522903"), "(657) 252-2903");
        assert_eq!(format_phone_number("+1 657-252-2903"), "(657) 252-2903");
        assert_eq!(format_phone_number("657.252.2903"), "(657) 252-2903");
        assert_eq!(format_phone_number(" 12345 "), "12345");
        assert_eq!(format_phone_number(""), "");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(
            normalize_phone("(657) 252-2903").as_deref(),
            Some("+16572522903")
        );
        assert_eq!(normalize_phone("16572522903").as_deref(), Some("+16572522903"));
        assert_eq!(normalize_phone("26572522903"), None);
        assert!(!is_valid_phone("555-1234"));
    }
}
