use crate::booking::reply::Reply;
use crate::booking::slot::Slot;
use crate::database::store::StoreError;
use chrono::NaiveDate;
use std::fmt;

pub const GENERIC_FAILURE: &str = "An error occurred while processing your request. Please try again.";
pub const RESERVATION_MISSING: &str =
    "It seems your reservation is missing. Please start again with /select_date.";

/// Why a booking action did not go through.
///
/// None of these are fatal; each maps to one user-visible reply and leaves
/// the session unchanged unless the caller resets it explicitly.
#[derive(Debug)]
pub enum BookingError {
    /// Malformed free text or callback payload.
    InvalidInput(String),
    /// The action needs a step the user has not completed.
    Precondition(String),
    /// The slot is no longer offerable, or someone else just took it.
    SlotUnavailable { date: NaiveDate, slot: Slot },
    /// The session points at no reservation, or at one that is gone.
    ReservationMissing,
    Store(StoreError),
}

impl BookingError {
    pub fn reply(&self) -> Reply {
        match self {
            BookingError::InvalidInput(message) => Reply::error(message.clone()),
            BookingError::Precondition(message) => Reply::info(message.clone()),
            BookingError::SlotUnavailable { date, slot }
            | BookingError::Store(StoreError::SlotTaken { date, slot }) => Reply::warning(format!(
                "Sorry, {slot} on {date} has just been taken. Please choose another slot."
            )),
            BookingError::ReservationMissing | BookingError::Store(StoreError::NotFound) => {
                Reply::warning(RESERVATION_MISSING)
            }
            BookingError::Store(StoreError::Database(_)) => Reply::error(GENERIC_FAILURE),
        }
    }

    /// Store failures are logged as errors, everything else as rejected input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, BookingError::Store(StoreError::Database(_)))
    }
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::InvalidInput(message) => write!(f, "invalid input: {message}"),
            BookingError::Precondition(message) => write!(f, "precondition failed: {message}"),
            BookingError::SlotUnavailable { date, slot } => write!(f, "slot {slot} on {date} unavailable"),
            BookingError::ReservationMissing => write!(f, "reservation missing from session"),
            BookingError::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::feedback::FeedbackType;

    #[test]
    fn test_store_failure_maps_to_generic_error() {
        let err = BookingError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let reply = err.reply();
        assert_eq!(reply.kind, FeedbackType::Error);
        assert_eq!(reply.text, GENERIC_FAILURE);
        assert!(err.is_store_failure());
    }

    #[test]
    fn test_slot_taken_and_unavailable_share_message() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slot = Slot::new(14).unwrap();
        let taken = BookingError::Store(StoreError::SlotTaken { date, slot }).reply();
        let unavailable = BookingError::SlotUnavailable { date, slot }.reply();
        assert_eq!(taken, unavailable);
        assert!(taken.text.contains("14:00 on 2024-06-01"));
    }

    #[test]
    fn test_precondition_is_guidance_not_error() {
        let reply = BookingError::Precondition("Pick a date first".to_string()).reply();
        assert_eq!(reply.kind, FeedbackType::Info);
        assert!(!BookingError::Precondition(String::new()).is_store_failure());
    }
}
