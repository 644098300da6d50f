// ABOUTME: Staff account setup utility for bootstrapping the first admin and managing logins
// ABOUTME: Command-line interface that writes bcrypt-hashed accounts straight to the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

//! Creates and maintains back-office accounts before anyone can sign in.
//!
//! Usage:
//! ```bash
//! # Create the first admin
//! cargo run --bin salon-admin-setup -- create-admin-user --email owner@salon.test --password changeme123
//!
//! # Create a groomer
//! cargo run --bin salon-admin-setup -- create-user --email sam@salon.test --password changeme123 --name Sam
//!
//! # Reset a password (also re-enables the account)
//! cargo run --bin salon-admin-setup -- reset-password --email sam@salon.test --password newpass123
//!
//! # List accounts
//! cargo run --bin salon-admin-setup -- list-users
//! ```

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use salon_server::auth::AuthManager;
use salon_server::config::{DatabaseUrl, ServerConfig};
use salon_server::database::Database;
use salon_server::models::{StaffUser, UserRole};
use salon_server::validation::is_valid_email;
use tracing::{info, warn};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Parser)]
#[command(
    name = "salon-admin-setup",
    about = "Salon back-office account management",
    long_about = "Create the first admin, add staff accounts and reset passwords without going through the API."
)]
struct AdminSetupArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create or update the admin user for dashboard login
    CreateAdminUser {
        /// Admin email (required)
        #[arg(long)]
        email: String,

        /// Admin password (required)
        #[arg(long)]
        password: String,

        /// Admin display name
        #[arg(long, default_value = "Salon Admin")]
        name: String,

        /// Reset the password if the user already exists
        #[arg(long)]
        force: bool,
    },

    /// Create a groomer account
    CreateUser {
        /// Login email
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Name on the schedule
        #[arg(long)]
        name: String,
    },

    /// Set a new password and re-enable the account
    ResetPassword {
        /// Login email
        #[arg(long)]
        email: String,

        /// New password
        #[arg(long)]
        password: String,
    },

    /// List all staff accounts
    ListUsers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminSetupArgs::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url);
    }
    info!("Connecting to database: {}", config.database.url);
    let database = Database::new(&config.database.url.to_connection_string()).await?;
    let auth = AuthManager::new(&config.auth);

    match args.command {
        AdminCommand::CreateAdminUser {
            email,
            password,
            name,
            force,
        } => {
            create_user_command(
                &database,
                &auth,
                &email,
                &password,
                name,
                UserRole::Admin,
                force,
            )
            .await?;
        }
        AdminCommand::CreateUser {
            email,
            password,
            name,
        } => {
            create_user_command(
                &database,
                &auth,
                &email,
                &password,
                name,
                UserRole::Groomer,
                false,
            )
            .await?;
        }
        AdminCommand::ResetPassword { email, password } => {
            reset_password_command(&database, &auth, &email, &password).await?;
        }
        AdminCommand::ListUsers => list_users_command(&database).await?,
    }

    Ok(())
}

fn check_credentials(email: &str, password: &str) -> Result<()> {
    if !is_valid_email(email.trim()) {
        return Err(anyhow!("'{email}' is not a valid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(anyhow!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Create a staff user, or reset an existing one when `force` is set
async fn create_user_command(
    database: &Database,
    auth: &AuthManager,
    email: &str,
    password: &str,
    name: String,
    role: UserRole,
    force: bool,
) -> Result<()> {
    check_credentials(email, password)?;
    let hash = auth.hash_password(password).await?;

    if let Some(existing) = database.get_user_by_email(email).await? {
        if !force {
            warn!("User {} already exists", existing.email);
            info!("Use --force to reset the password");
            return Err(anyhow!("User already exists"));
        }
        database.reset_user_password(existing.id, &hash).await?;
        info!("Password reset for existing user {}", existing.email);
        return Ok(());
    }

    let user = StaffUser::new(email, hash, name, role);
    database.create_user(&user).await?;
    info!("Created {} account", user.role);
    info!("  Email: {}", user.email);
    info!("  Name:  {}", user.display_name);
    info!("  ID:    {}", user.id);
    if role == UserRole::Admin && database.count_admins().await? == 1 {
        info!("This is the first admin; sign in at POST /api/auth/login");
    }
    Ok(())
}

async fn reset_password_command(
    database: &Database,
    auth: &AuthManager,
    email: &str,
    password: &str,
) -> Result<()> {
    check_credentials(email, password)?;
    let user = database
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| anyhow!("No user with email {email}"))?;
    let hash = auth.hash_password(password).await?;
    database.reset_user_password(user.id, &hash).await?;
    info!("Password reset for {}", user.email);
    Ok(())
}

async fn list_users_command(database: &Database) -> Result<()> {
    let users = database.list_users().await?;
    if users.is_empty() {
        println!("No staff accounts found.");
        println!("Create the first admin with: salon-admin-setup create-admin-user --email ... --password ...");
        return Ok(());
    }

    println!("\nStaff accounts:");
    println!("{}", "=".repeat(72));
    for user in users {
        println!(
            "{:<32} {:<8} {:<8} {}",
            user.email,
            user.role.as_str(),
            if user.is_active { "active" } else { "disabled" },
            user.display_name
        );
    }
    println!("{}", "=".repeat(72));
    Ok(())
}
