// ABOUTME: Appointment lifecycle: the status transition table and the service applying it
// ABOUTME: Status changes notify customers and release cancelled slots to the waitlist
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

/// Status changes and rescheduling
pub mod service;
/// Transition table
pub mod status;

pub use service::{AppointmentService, StatusChange, StatusChangeRequest};
pub use status::{
    can_transition, find_transition, transitions_from, validate_transition, Transition,
};
