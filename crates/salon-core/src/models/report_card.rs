// ABOUTME: Post-appointment report card model
// ABOUTME: Groomer notes, behavior rating and photos delivered to the customer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of a completed grooming visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCard {
    /// Unique identifier
    pub id: Uuid,
    /// Completed appointment this card describes
    pub appointment_id: Uuid,
    /// What was done and how it went
    pub groomer_notes: String,
    /// 1 (difficult) to 5 (angel)
    pub behavior_rating: u8,
    /// Matting, skin irritation, shedding ...
    pub coat_condition: Option<String>,
    /// Before/after photo URLs
    pub photo_urls: Vec<String>,
    /// Home-care recommendations
    pub recommendations: Option<String>,
    /// Suggested weeks until the next visit
    pub next_visit_weeks: Option<u32>,
    /// When it was delivered
    pub sent_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
