use tracing::{debug, error, info, warn};

/// Logs the start of a user action with consistent format
pub fn log_action_start(action: &str, user: &str, user_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("ACTION_START: {} by {}({}) - {}", action, user, user_id, d),
        None => info!("ACTION_START: {} by {}({})", action, user, user_id),
    }
}

/// Logs an action turned away because of bad input or a missing prior step
pub fn log_action_rejected(action: &str, user_id: i64, reason: &str) {
    warn!("ACTION_REJECTED: {} by user {} - {}", action, user_id, reason);
}

/// Logs a booking session step change
pub fn log_transition(user_id: i64, from: &str, to: &str) {
    if from != to {
        info!("TRANSITION: user {} {} -> {}", user_id, from, to);
    }
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
