// ABOUTME: Server binary for the grooming salon back-office API
// ABOUTME: Loads configuration, opens the database and serves HTTP with background jobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! # Salon Server Binary
//!
//! Starts the booking and back-office API. Configuration comes from the
//! environment; `--http-port` and `--database-url` override it.

use anyhow::{Context, Result};
use clap::Parser;
use salon_server::config::{DatabaseUrl, ServerConfig};
use salon_server::database::Database;
use salon_server::logging;
use salon_server::resources::ServerResources;
use salon_server::server;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "salon-server")]
#[command(about = "Grooming salon back-office API - bookings, waitlist, notifications and campaigns")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url);
    }

    logging::init_from_env()?;

    info!("Starting salon server");
    info!("{}", config.summary());

    if let DatabaseUrl::SQLite { path } = &config.database.url {
        ensure_parent_dir(path)?;
    }
    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database initialized");

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, config));

    display_available_endpoints(port);

    if let Err(e) = server::run(resources, port).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display())),
        _ => Ok(()),
    }
}

fn display_available_endpoints(port: u16) {
    let host = format!("http://localhost:{port}");
    info!("=== Available API Endpoints ===");
    info!("Health:        GET  {host}/health");
    info!("Catalog:       GET  {host}/api/services");
    info!("Availability:  GET  {host}/api/availability?date=&service_id=");
    info!("Book:          POST {host}/api/bookings");
    info!("Waitlist:      POST {host}/api/waitlist");
    info!("Staff login:   POST {host}/api/auth/login");
    info!("Back office:        {host}/api/admin/...");
    info!("=== End of Endpoint List ===");
}
