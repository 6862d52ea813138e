//! The persistence seam used by the booking controller and the reminder sweep.

use crate::booking::slot::Slot;
use crate::database::connection::DatabaseManager;
use crate::database::models::{NewReservation, PaymentUpdate, PersonalDetails, Reservation};
use crate::utils::logging::{log_database_error, log_database_operation};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Another reservation already holds this (date, slot).
    SlotTaken { date: NaiveDate, slot: Slot },
    /// The addressed reservation no longer exists.
    NotFound,
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::SlotTaken { date, slot } => write!(f, "slot {slot} on {date} is already reserved"),
            StoreError::NotFound => write!(f, "reservation not found"),
            StoreError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// CRUD access to reservation records. Holds no business rules.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persists a new pending reservation. Fails with `SlotTaken` when the
    /// (date, slot) pair is already held by anyone.
    async fn create(&self, new: NewReservation) -> Result<Reservation, StoreError>;

    async fn booked_slots(&self, date: NaiveDate) -> Result<HashSet<Slot>, StoreError>;

    /// Fails with `NotFound` unless reservation `id` exists and belongs to `user_id`.
    async fn update_details(&self, user_id: i64, id: i64, details: &PersonalDetails) -> Result<(), StoreError>;

    /// Fails with `NotFound` unless reservation `id` exists and belongs to `user_id`.
    async fn update_payment(&self, user_id: i64, id: i64, update: &PaymentUpdate) -> Result<(), StoreError>;

    /// Reservations of `user_id` dated `today` or later, earliest first.
    async fn current_for_user(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    async fn all_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, StoreError>;

    /// Deletes the user's reservation for (date, slot); returns rows removed.
    async fn cancel_slot(&self, user_id: i64, date: NaiveDate, slot: Slot) -> Result<u64, StoreError>;

    async fn cancel_all(&self, user_id: i64) -> Result<u64, StoreError>;

    /// Unreminded reservations whose slot starts in `(from, to]`.
    async fn due_for_reminder(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Reservation>, StoreError>;

    async fn mark_reminded(&self, id: i64, at: NaiveDateTime) -> Result<(), StoreError>;
}

/// `ReservationStore` over the service's SQLite database.
#[derive(Clone)]
pub struct SqliteReservationStore {
    db: DatabaseManager,
}

impl SqliteReservationStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        // 2067 is SQLITE_CONSTRAINT_UNIQUE
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("2067") || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

fn logged<T>(operation: &str, result: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    result.map_err(|e| {
        log_database_error(operation, "reservations", &e.to_string(), None);
        StoreError::Database(e)
    })
}

fn require_row(rows_affected: u64) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
    async fn create(&self, new: NewReservation) -> Result<Reservation, StoreError> {
        let details = format!("{} {} for user {}", new.date, new.slot, new.user_id);
        log_database_operation("INSERT", "reservations", Some(&details));

        match Reservation::create(&self.db.pool, &new).await {
            Ok(reservation) => Ok(reservation),
            Err(e) if is_unique_violation(&e) => {
                log_database_operation("INSERT", "reservations", Some("rejected: slot already reserved"));
                Err(StoreError::SlotTaken {
                    date: new.date,
                    slot: new.slot,
                })
            }
            Err(e) => logged("INSERT", Err(e)),
        }
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<HashSet<Slot>, StoreError> {
        let slots = logged("SELECT", Reservation::booked_slots(&self.db.pool, date).await)?;
        Ok(slots.into_iter().collect())
    }

    async fn update_details(&self, user_id: i64, id: i64, details: &PersonalDetails) -> Result<(), StoreError> {
        log_database_operation("UPDATE", "reservations", Some(&format!("details of {id}")));
        let result = logged("UPDATE", Reservation::update_details(&self.db.pool, user_id, id, details).await)?;
        require_row(result.rows_affected())
    }

    async fn update_payment(&self, user_id: i64, id: i64, update: &PaymentUpdate) -> Result<(), StoreError> {
        log_database_operation("UPDATE", "reservations", Some(&format!("payment of {id} -> {}", update.method)));
        let result = logged("UPDATE", Reservation::update_payment(&self.db.pool, user_id, id, update).await)?;
        require_row(result.rows_affected())
    }

    async fn current_for_user(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        logged("SELECT", Reservation::find_for_user_from(&self.db.pool, user_id, today).await)
    }

    async fn all_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, StoreError> {
        logged("SELECT", Reservation::find_for_user(&self.db.pool, user_id).await)
    }

    async fn cancel_slot(&self, user_id: i64, date: NaiveDate, slot: Slot) -> Result<u64, StoreError> {
        log_database_operation("DELETE", "reservations", Some(&format!("{date} {slot} for user {user_id}")));
        let result = logged("DELETE", Reservation::delete_for_user_slot(&self.db.pool, user_id, date, slot).await)?;
        Ok(result.rows_affected())
    }

    async fn cancel_all(&self, user_id: i64) -> Result<u64, StoreError> {
        log_database_operation("DELETE", "reservations", Some(&format!("all for user {user_id}")));
        let result = logged("DELETE", Reservation::delete_for_user(&self.db.pool, user_id).await)?;
        Ok(result.rows_affected())
    }

    async fn due_for_reminder(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Reservation>, StoreError> {
        let dates: Vec<NaiveDate> = from.date().iter_days().take_while(|d| *d <= to.date()).collect();
        let candidates = logged("SELECT", Reservation::find_unreminded_on(&self.db.pool, &dates).await)?;

        Ok(candidates
            .into_iter()
            .filter(|r| r.starts_at().is_some_and(|start| start > from && start <= to))
            .collect())
    }

    async fn mark_reminded(&self, id: i64, at: NaiveDateTime) -> Result<(), StoreError> {
        let result = logged("UPDATE", Reservation::mark_reminded(&self.db.pool, id, at).await)?;
        require_row(result.rows_affected())
    }
}
