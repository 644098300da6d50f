// ABOUTME: Shared resource container handed to every route group
// ABOUTME: Builds the database-backed services once and shares them behind Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::appointments::AppointmentService;
use crate::auth::AuthManager;
use crate::booking::BookingService;
use crate::campaigns::CampaignService;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::notifications::{providers, NotificationService, Providers};
use crate::report_cards::ReportCardService;
use crate::waitlist::WaitlistService;
use std::sync::Arc;

/// Everything a request handler or background job needs
#[derive(Clone)]
pub struct ServerResources {
    /// Storage
    pub database: Arc<Database>,
    /// Token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// Outbound messages
    pub notifications: NotificationService,
    /// Booking submission
    pub bookings: BookingService,
    /// Status changes and rescheduling
    pub appointments: AppointmentService,
    /// Waitlist offers
    pub waitlist: WaitlistService,
    /// Marketing campaigns
    pub campaigns: CampaignService,
    /// Report cards
    pub report_cards: ReportCardService,
    /// Startup configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire services with the providers selected by the configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let providers = providers::from_config(&config.notifications);
        Self::with_providers(database, config, providers)
    }

    /// Wire services with explicit providers (tests use the mocks)
    #[must_use]
    pub fn with_providers(
        database: Database,
        config: ServerConfig,
        providers: Providers,
    ) -> Self {
        let database = Arc::new(database);
        let base_url = config
            .notifications
            .public_base_url
            .trim_end_matches('/')
            .to_owned();

        let notifications = NotificationService::new(database.clone(), providers);
        let waitlist =
            WaitlistService::new(database.clone(), notifications.clone(), base_url.clone());
        let appointments =
            AppointmentService::new(database.clone(), notifications.clone(), waitlist.clone());
        let bookings = BookingService::new(database.clone(), notifications.clone());
        let campaigns = CampaignService::new(database.clone(), notifications.clone(), base_url);
        let report_cards = ReportCardService::new(database.clone(), notifications.clone());

        Self {
            auth_manager: Arc::new(AuthManager::new(&config.auth)),
            database,
            notifications,
            bookings,
            appointments,
            waitlist,
            campaigns,
            report_cards,
            config: Arc::new(config),
        }
    }
}
