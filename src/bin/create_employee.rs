use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use printhub_api::{
    auth::{AuthConfig, AuthService},
    config, db,
    events::{Event, EventSender},
    services::users::{CreateEmployeeRequest, UserService},
};
use tokio::sync::mpsc;
use tracing::debug;

/// Creates a staff account. Fails when the email is already registered.
#[derive(Parser)]
#[command(name = "create-employee", about = "Create a PrintHub staff account", version)]
struct Cli {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Name shown on order logs and reviews
    #[arg(long)]
    name: String,
    /// Grant administrator rights
    #[arg(long, action = ArgAction::SetTrue)]
    admin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load application config")?;
    config::init_tracing(config.log_level(), config.log_json);

    let db_pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;
    let db = Arc::new(db_pool);

    let (event_tx, mut event_rx) = mpsc::channel::<Event>(8);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(target: "create_employee", event = ?event, "received event");
        }
    });

    let auth_service = Arc::new(AuthService::new(AuthConfig::from(&config)));
    let users = UserService::new(db, Arc::new(EventSender::new(event_tx)), auth_service);

    let profile = users
        .create_employee(CreateEmployeeRequest {
            email: cli.email,
            password: cli.password,
            employee_name: cli.name,
            is_admin: cli.admin,
        })
        .await
        .context("failed to create employee")?;

    println!(
        "Created {} {} ({})",
        profile.role, profile.email, profile.id
    );
    Ok(())
}
