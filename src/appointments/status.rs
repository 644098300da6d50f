// ABOUTME: Static appointment status transition table with action labels
// ABOUTME: Destructive moves (cancel, no-show) need explicit confirmation from the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::AppointmentStatus;
use crate::models::AppointmentStatus::{
    Cancelled, CheckedIn, Completed, Confirmed, InProgress, NoShow, Pending,
};
use serde::Serialize;

/// One allowed status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Current status
    pub from: AppointmentStatus,
    /// New status
    pub to: AppointmentStatus,
    /// Button label
    pub label: &'static str,
    /// Ask "are you sure?" first
    pub requires_confirmation: bool,
}

const fn edge(
    from: AppointmentStatus,
    to: AppointmentStatus,
    label: &'static str,
    requires_confirmation: bool,
) -> Transition {
    Transition {
        from,
        to,
        label,
        requires_confirmation,
    }
}

/// Every allowed transition
pub const TRANSITIONS: &[Transition] = &[
    edge(Pending, Confirmed, "Confirm Appointment", false),
    edge(Pending, Cancelled, "Cancel Appointment", true),
    edge(Confirmed, CheckedIn, "Check In", false),
    edge(Confirmed, Cancelled, "Cancel Appointment", true),
    edge(Confirmed, NoShow, "Mark as No-Show", true),
    edge(CheckedIn, InProgress, "Start Grooming", false),
    edge(CheckedIn, Cancelled, "Cancel Appointment", true),
    edge(InProgress, Completed, "Mark Complete", false),
];

/// Transitions leaving `from`, in table order
pub fn transitions_from(from: AppointmentStatus) -> impl Iterator<Item = &'static Transition> {
    TRANSITIONS.iter().filter(move |t| t.from == from)
}

/// The edge `from -> to`, if allowed
#[must_use]
pub fn find_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Whether `from -> to` is in the table
#[must_use]
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    find_transition(from, to).is_some()
}

/// Check a requested change
///
/// # Errors
///
/// Returns `INVALID_STATUS_TRANSITION` for an edge not in the table and
/// `CONFIRMATION_REQUIRED` when the edge needs confirmation and `confirmed` is false
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
    confirmed: bool,
) -> AppResult<&'static Transition> {
    let transition =
        find_transition(from, to).ok_or_else(|| AppError::invalid_transition(from, to))?;
    if transition.requires_confirmation && !confirmed {
        return Err(AppError::new(
            ErrorCode::ConfirmationRequired,
            format!("\"{}\" must be confirmed", transition.label),
        ));
    }
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_have_no_edges() {
        for status in AppointmentStatus::ALL {
            assert_eq!(
                transitions_from(status).next().is_none(),
                status.is_terminal(),
                "{status}"
            );
        }
    }

    #[test]
    fn test_table_labels() {
        let labels: Vec<&str> = transitions_from(Confirmed).map(|t| t.label).collect();
        assert_eq!(labels, ["Check In", "Cancel Appointment", "Mark as No-Show"]);
        assert!(can_transition(InProgress, Completed));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Completed, Cancelled));
    }

    #[test]
    fn test_validate_transition() {
        assert!(validate_transition(Pending, Confirmed, false).is_ok());
        assert_eq!(
            validate_transition(Pending, Cancelled, false).err().map(|e| e.code),
            Some(ErrorCode::ConfirmationRequired)
        );
        assert!(validate_transition(Pending, Cancelled, true).is_ok());
        assert_eq!(
            validate_transition(Cancelled, Pending, true).err().map(|e| e.code),
            Some(ErrorCode::InvalidStatusTransition)
        );
    }
}
