use crate::booking::calendar::{SlotCalendar, WorkingHours};
use anyhow::{anyhow, Result};
use chrono::Duration;
use std::env;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/playroom.db";
pub const DEFAULT_SESSION_STORAGE_PATH: &str = "./data/sessions.sqlite";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    /// SQLite file holding per-chat booking sessions.
    pub session_storage_path: String,
    pub http_port: u16,
    pub open_hour: u8,
    pub close_hour: u8,
    pub booking_horizon_days: u32,
    pub session_ttl_minutes: i64,
    pub reminder_lead_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN").map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let open_hour: u8 = parsed_var("OPEN_HOUR", 10)?;
        let close_hour: u8 = parsed_var("CLOSE_HOUR", 21)?;
        if WorkingHours::new(open_hour, close_hour).is_none() {
            return Err(anyhow!(
                "Invalid working hours: OPEN_HOUR ({open_hour}) must not exceed CLOSE_HOUR ({close_hour}), which must be at most 23"
            ));
        }

        let booking_horizon_days: u32 = parsed_var("BOOKING_HORIZON_DAYS", 7)?;
        if !(1..=31).contains(&booking_horizon_days) {
            return Err(anyhow!("Invalid BOOKING_HORIZON_DAYS: must be between 1 and 31"));
        }

        let session_ttl_minutes: i64 = parsed_var("SESSION_TTL_MINUTES", 120)?;
        if session_ttl_minutes <= 0 {
            return Err(anyhow!("Invalid SESSION_TTL_MINUTES: must be positive"));
        }

        let reminder_lead_minutes: i64 = parsed_var("REMINDER_LEAD_MINUTES", 15)?;
        if reminder_lead_minutes <= 0 {
            return Err(anyhow!("Invalid REMINDER_LEAD_MINUTES: must be positive"));
        }

        Ok(Config {
            telegram_bot_token: token,
            database_url: Self::database_url_from_env(),
            session_storage_path: var_or("SESSION_STORAGE_PATH", DEFAULT_SESSION_STORAGE_PATH),
            http_port: parsed_var("HTTP_PORT", 3000)?,
            open_hour,
            close_hour,
            booking_horizon_days,
            session_ttl_minutes,
            reminder_lead_minutes,
        })
    }

    /// `DATABASE_URL` alone; the migration tool needs nothing else.
    pub fn database_url_from_env() -> String {
        var_or("DATABASE_URL", DEFAULT_DATABASE_URL)
    }

    pub fn calendar(&self) -> SlotCalendar {
        let hours = WorkingHours::new(self.open_hour, self.close_hour).unwrap_or_default();
        SlotCalendar::new(hours, self.booking_horizon_days)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes)
    }

    pub fn reminder_lead(&self) -> Duration {
        Duration::minutes(self.reminder_lead_minutes)
    }
}

/// Unset and blank both mean "use the default".
fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().map_err(|_| anyhow!("Invalid {name}")),
        _ => Ok(default),
    }
}
