//! Inline keyboard payloads.
//!
//! | action  | payload                   |
//! |---------|---------------------------|
//! | date    | `2024-06-01`              |
//! | slot    | `2024-06-01 14:00`        |
//! | payment | `payment:online`          |
//! | cancel  | `cancel:2024-06-01:14:00` |

use crate::booking::slot::Slot;
use crate::database::models::PaymentMethod;
use crate::utils::datetime::{format_date, parse_date};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Date(NaiveDate),
    Slot { date: NaiveDate, slot: Slot },
    Payment(PaymentMethod),
    Cancel { date: NaiveDate, slot: Slot },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParseError(pub String);

impl fmt::Display for CallbackParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized callback data '{}'", self.0)
    }
}

impl std::error::Error for CallbackParseError {}

impl CallbackData {
    pub fn encode(&self) -> String {
        match self {
            CallbackData::Date(date) => format_date(*date),
            CallbackData::Slot { date, slot } => format!("{} {}", format_date(*date), slot),
            CallbackData::Payment(method) => format!("payment:{method}"),
            CallbackData::Cancel { date, slot } => format!("cancel:{}:{}", format_date(*date), slot),
        }
    }

    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let err = || CallbackParseError(data.to_string());

        if let Some(method) = data.strip_prefix("payment:") {
            return method.parse().map(CallbackData::Payment).map_err(|_| err());
        }

        if let Some(rest) = data.strip_prefix("cancel:") {
            let (date, slot) = rest.split_once(':').ok_or_else(err)?;
            let date = parse_date(date).ok_or_else(err)?;
            let slot = slot.parse().map_err(|_| err())?;
            return Ok(CallbackData::Cancel { date, slot });
        }

        if let Some((date, slot)) = data.split_once(' ') {
            let date = parse_date(date).ok_or_else(err)?;
            let slot = slot.parse().map_err(|_| err())?;
            return Ok(CallbackData::Slot { date, slot });
        }

        parse_date(data).map(CallbackData::Date).ok_or_else(err)
    }
}
