use crate::booking::calendar::SlotCalendar;
use crate::database::store::{ReservationStore, SqliteReservationStore};
use crate::services::clock::Clock;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub booking: BookingHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

/// What a user asking for today's slots would see right now.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingHealth {
    pub today: NaiveDate,
    pub open_hour: u8,
    pub close_hour: u8,
    pub offerable_slots_today: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteReservationStore>,
    pub calendar: SlotCalendar,
    pub clock: Arc<dyn Clock>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(store: Arc<SqliteReservationStore>, calendar: SlotCalendar, clock: Arc<dyn Clock>) -> Self {
        let state = AppState {
            store,
            calendar,
            clock,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();
    let healthy = state.store.database().ping().await.is_ok();
    let response_time_ms = start.elapsed().as_millis() as u64;

    if !healthy {
        tracing::warn!("Health check failed: database unreachable");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let now = state.clock.now();
    let booked = state
        .store
        .booked_slots(now.date())
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    let offerable_slots_today = state.calendar.slots(now.date(), now, &booked).len();

    let uptime = Utc::now().signed_duration_since(state.start_time).num_seconds().max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: "healthy".to_string(),
            connection_pool_size: state.store.database().pool.size(),
            response_time_ms,
        },
        booking: BookingHealth {
            today: now.date(),
            open_hour: state.calendar.hours().open_hour(),
            close_hour: state.calendar.hours().close_hour(),
            offerable_slots_today,
        },
        uptime_seconds: uptime,
    }))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.store.database().ping().await {
        Ok(()) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
