// ABOUTME: Customer-facing strings for every API error code
// ABOUTME: Static lookup table shown by booking and back-office screens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::ErrorCode;

impl ErrorCode {
    /// Message safe to show to a customer or front-desk user
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Please sign in to continue.",
            Self::AuthInvalid => "We couldn't verify your sign-in. Please check your email and password.",
            Self::AuthExpired => "Your session has expired. Please sign in again.",
            Self::PermissionDenied => "You don't have access to this area.",
            Self::RateLimitExceeded => "Too many requests. Please wait a moment and try again.",
            Self::InvalidInput | Self::InvalidFormat => {
                "Some of the information entered isn't valid. Please review the highlighted fields."
            }
            Self::MissingRequiredField => "Please fill in all required fields.",
            Self::ValueOutOfRange => "One of the values entered is outside the allowed range.",
            Self::ResourceNotFound => "We couldn't find what you were looking for.",
            Self::ResourceAlreadyExists => "This record already exists.",
            Self::ResourceLocked => "This item can no longer be changed.",
            Self::SlotUnavailable => {
                "Sorry, that time is no longer available. Please choose another time."
            }
            Self::BookingIncomplete => "Please complete all steps before booking.",
            Self::InvalidStatusTransition => "This appointment can't be moved to that status.",
            Self::ConfirmationRequired => "Please confirm this change before continuing.",
            Self::OfferExpired => {
                "Sorry, this offer has expired. We'll let you know if another spot opens up."
            }
            Self::OfferClosed => "This offer has already been answered.",
            Self::RecipientUnreachable => {
                "This customer has no phone or email we're allowed to contact."
            }
            Self::ExternalServiceError | Self::ExternalServiceUnavailable => {
                "We couldn't send your message right now. Please try again shortly."
            }
            Self::ConfigError | Self::ConfigMissing => {
                "The salon system isn't fully set up yet. Please contact the salon."
            }
            Self::InternalError | Self::DatabaseError | Self::SerializationError => {
                "Something went wrong on our end. Please try again or call the salon."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_has_a_message() {
        let codes = [
            ErrorCode::AuthRequired,
            ErrorCode::SlotUnavailable,
            ErrorCode::OfferExpired,
            ErrorCode::DatabaseError,
            ErrorCode::ConfirmationRequired,
        ];
        for code in codes {
            assert!(!code.user_message().is_empty(), "{code:?}");
            assert!(code.user_message().ends_with('.'), "{code:?}");
        }
    }
}
