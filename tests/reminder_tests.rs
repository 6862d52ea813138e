#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use playroom_booking_bot::booking::slot::Slot;
use playroom_booking_bot::database::connection::DatabaseManager;
use playroom_booking_bot::database::models::*;
use playroom_booking_bot::database::store::{ReservationStore, SqliteReservationStore, StoreError};
use playroom_booking_bot::services::reminder::{collect_due_reminders, deliver_due_reminders, reminder_text};
use std::collections::HashSet;
use std::sync::Mutex;
use teloxide::types::ChatId;
use tempfile::{tempdir, TempDir};

async fn setup_test_store() -> (SqliteReservationStore, TempDir) {
    let dir = tempdir().unwrap();
    let db_url = format!("sqlite:{}", dir.path().join("test.db").to_string_lossy());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (SqliteReservationStore::new(db), dir)
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

async fn book(store: &SqliteReservationStore, hour: u8, user_id: i64) -> i64 {
    store
        .create(NewReservation {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            slot: Slot::new(hour).unwrap(),
            user_id,
            username: None,
            created_at: at("2024-05-31 10:00"),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_only_slots_within_lead_are_due() {
    let (store, _dir) = setup_test_store().await;
    let soon = book(&store, 14, 1).await;
    book(&store, 15, 2).await;
    book(&store, 13, 3).await;

    let due = collect_due_reminders(&store, at("2024-06-01 13:45"), Duration::minutes(15)).await.unwrap();

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, soon);
    assert_eq!(due[0].user_id, 1);
}

#[tokio::test]
async fn test_reminded_reservations_are_not_due_again() {
    let (store, _dir) = setup_test_store().await;
    let id = book(&store, 14, 1).await;
    let lead = Duration::minutes(15);

    let now = at("2024-06-01 13:46");
    assert_eq!(collect_due_reminders(&store, now, lead).await.unwrap().len(), 1);

    store.mark_reminded(id, now).await.unwrap();

    for minutes in 0..14 {
        let later = now + Duration::minutes(minutes);
        assert!(collect_due_reminders(&store, later, lead).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_longer_lead_catches_more_slots() {
    let (store, _dir) = setup_test_store().await;
    book(&store, 14, 1).await;
    book(&store, 15, 2).await;
    book(&store, 16, 3).await;

    let due = collect_due_reminders(&store, at("2024-06-01 13:30"), Duration::minutes(90)).await.unwrap();
    let hours: Vec<u8> = due.iter().map(|r| r.slot.hour()).collect();
    assert_eq!(hours, vec![14, 15]);
}

#[tokio::test]
async fn test_reminder_text_names_the_slot() {
    let (store, _dir) = setup_test_store().await;
    book(&store, 18, 1).await;

    let due = collect_due_reminders(&store, at("2024-06-01 17:50"), Duration::minutes(15)).await.unwrap();
    let text = reminder_text(&due[0]);

    assert!(text.contains("Reminder: your playroom reservation is at 18:00. Please arrive on time!"));
}

/// Delegates to SQLite but refuses to stamp one reservation.
struct StampFailingStore {
    inner: SqliteReservationStore,
    unstampable: i64,
}

#[async_trait]
impl ReservationStore for StampFailingStore {
    async fn create(&self, new: NewReservation) -> Result<Reservation, StoreError> {
        self.inner.create(new).await
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<HashSet<Slot>, StoreError> {
        self.inner.booked_slots(date).await
    }

    async fn update_details(&self, user_id: i64, id: i64, details: &PersonalDetails) -> Result<(), StoreError> {
        self.inner.update_details(user_id, id, details).await
    }

    async fn update_payment(&self, user_id: i64, id: i64, update: &PaymentUpdate) -> Result<(), StoreError> {
        self.inner.update_payment(user_id, id, update).await
    }

    async fn current_for_user(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        self.inner.current_for_user(user_id, today).await
    }

    async fn all_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, StoreError> {
        self.inner.all_for_user(user_id).await
    }

    async fn cancel_slot(&self, user_id: i64, date: NaiveDate, slot: Slot) -> Result<u64, StoreError> {
        self.inner.cancel_slot(user_id, date, slot).await
    }

    async fn cancel_all(&self, user_id: i64) -> Result<u64, StoreError> {
        self.inner.cancel_all(user_id).await
    }

    async fn due_for_reminder(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Reservation>, StoreError> {
        self.inner.due_for_reminder(from, to).await
    }

    async fn mark_reminded(&self, id: i64, at: NaiveDateTime) -> Result<(), StoreError> {
        if id == self.unstampable {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.mark_reminded(id, at).await
    }
}

#[tokio::test]
async fn test_failed_stamp_does_not_stop_the_sweep() {
    let (inner, _dir) = setup_test_store().await;
    let first = book(&inner, 14, 1).await;
    book(&inner, 15, 2).await;
    let store = StampFailingStore { inner, unstampable: first };

    let now = at("2024-06-01 13:30");
    let lead = Duration::minutes(90);
    let delivered = Mutex::new(Vec::new());

    let sent = deliver_due_reminders(&store, now, lead, |chat_id, _text| {
        delivered.lock().unwrap().push(chat_id);
        async { Ok::<(), String>(()) }
    })
    .await
    .unwrap();

    assert_eq!(sent, 2);
    assert_eq!(*delivered.lock().unwrap(), vec![ChatId(1), ChatId(2)]);

    // Only the unstamped one comes back.
    let due = collect_due_reminders(&store, now, lead).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, first);
}

#[tokio::test]
async fn test_failed_delivery_is_retried_next_sweep() {
    let (store, _dir) = setup_test_store().await;
    book(&store, 14, 1).await;
    book(&store, 15, 2).await;

    let now = at("2024-06-01 13:30");
    let lead = Duration::minutes(90);

    let sent = deliver_due_reminders(&store, now, lead, |chat_id, _text| async move {
        if chat_id == ChatId(1) {
            Err("bot was blocked by the user".to_string())
        } else {
            Ok(())
        }
    })
    .await
    .unwrap();

    assert_eq!(sent, 1);
    let due = collect_due_reminders(&store, now, lead).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].user_id, 1);
}
