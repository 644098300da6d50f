// ABOUTME: Staff user model and role hierarchy for back-office access control
// ABOUTME: Customers book anonymously; groomers and admins authenticate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use super::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried in the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Customer account (public booking surface only)
    #[default]
    Customer,
    /// Groomer / front desk: runs the day's appointments
    Groomer,
    /// Owner or manager: settings, catalog, campaigns
    Admin,
}

text_enum!(UserRole {
    Customer => "customer",
    Groomer => "groomer",
    Admin => "admin",
});

impl UserRole {
    /// Groomer or admin
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Groomer | Self::Admin)
    }

    /// Admin only
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A back-office account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    /// Unique identifier
    pub id: Uuid,
    /// Login email (lower-cased)
    pub email: String,
    /// bcrypt hash, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Name shown on the schedule
    pub display_name: String,
    /// Access level
    pub role: UserRole,
    /// Disabled accounts cannot sign in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StaffUser {
    /// Create a new active staff user
    #[must_use]
    pub fn new(email: &str, password_hash: String, display_name: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            display_name,
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(!UserRole::Customer.is_staff());
        assert!(UserRole::Groomer.is_staff());
        assert!(!UserRole::Groomer.is_admin());
        assert!(UserRole::Admin.is_staff() && UserRole::Admin.is_admin());
        assert!(UserRole::Admin > UserRole::Groomer);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("groomer"), Some(UserRole::Groomer));
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
