//! # Playroom Booking Bot Entry Point
//!
//! Initializes logging, loads configuration, prepares the reservation
//! database and the session store, starts the reminder sweep and the health
//! server, and runs the Telegram dispatcher.

use anyhow::Result;
use playroom_booking_bot::booking::controller::ConversationController;
use playroom_booking_bot::bot::handlers::{BotHandler, SessionStorage};
use playroom_booking_bot::config::Config;
use playroom_booking_bot::database::connection::DatabaseManager;
use playroom_booking_bot::database::store::SqliteReservationStore;
use playroom_booking_bot::services::clock::{Clock, SystemClock};
use playroom_booking_bot::services::health::HealthService;
use playroom_booking_bot::services::reminder::ReminderService;
use playroom_booking_bot::utils::logging::log_system_event;
use std::path::Path;
use std::sync::Arc;
use teloxide::dispatching::dialogue::serializer::Json;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playroom_booking_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Playroom Booking Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, hours {:02}:00-{:02}:00, horizon {} days",
        config.database_url, config.http_port, config.open_hour, config.close_hour, config.booking_horizon_days
    );

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let store = Arc::new(SqliteReservationStore::new(db_manager));
    info!("Database initialized successfully");

    if let Some(parent) = Path::new(&config.session_storage_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let storage = SessionStorage::open(&config.session_storage_path, Json)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open session storage {}: {}", config.session_storage_path, e))?;
    info!("Session storage opened at {}", config.session_storage_path);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let calendar = config.calendar();

    let controller = Arc::new(
        ConversationController::new(store.as_ref().clone(), calendar, clock.clone())
            .with_session_ttl(config.session_ttl()),
    );

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(controller);

    let mut reminder_service =
        match ReminderService::new(bot.clone(), store.clone(), clock.clone(), config.reminder_lead()).await {
            Ok(service) => service,
            Err(e) => {
                tracing::error!("Failed to create reminder service: {}", e);
                return Err(anyhow::anyhow!("Failed to create reminder service: {}", e));
            }
        };

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    let health_service = HealthService::new(store.clone(), calendar, clock);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);
    log_system_event("startup_complete", None);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![storage])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
