#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use playroom_booking_bot::booking::calendar::SlotCalendar;
use playroom_booking_bot::booking::controller::{ConversationController, UserIdentity};
use playroom_booking_bot::booking::error::{GENERIC_FAILURE, RESERVATION_MISSING};
use playroom_booking_bot::booking::session::{BookingSession, BookingStep};
use playroom_booking_bot::booking::slot::Slot;
use playroom_booking_bot::database::models::*;
use playroom_booking_bot::database::store::{ReservationStore, StoreError};
use playroom_booking_bot::services::clock::FixedClock;
use playroom_booking_bot::utils::feedback::FeedbackType;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Working,
    SlotTaken,
    Broken,
}

/// Records every call and answers according to its mode.
struct RecordingStore {
    mode: Mode,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingStore {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        match self.mode {
            Mode::Broken => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ReservationStore for RecordingStore {
    async fn create(&self, new: NewReservation) -> Result<Reservation, StoreError> {
        self.record("create")?;
        if self.mode == Mode::SlotTaken {
            return Err(StoreError::SlotTaken {
                date: new.date,
                slot: new.slot,
            });
        }
        Ok(Reservation {
            id: 1,
            date: new.date,
            slot: new.slot,
            user_id: new.user_id,
            username: new.username,
            name: None,
            surname: None,
            phone: None,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            payment_id: None,
            created_at: new.created_at,
            reminder_sent_at: None,
        })
    }

    async fn booked_slots(&self, _date: NaiveDate) -> Result<HashSet<Slot>, StoreError> {
        // Reads succeed in every mode except Broken.
        self.calls.lock().unwrap().push("booked_slots");
        match self.mode {
            Mode::Broken => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
            _ => Ok(HashSet::new()),
        }
    }

    async fn update_details(&self, _user_id: i64, _id: i64, _details: &PersonalDetails) -> Result<(), StoreError> {
        self.record("update_details")
    }

    async fn update_payment(&self, _user_id: i64, _id: i64, _update: &PaymentUpdate) -> Result<(), StoreError> {
        self.record("update_payment")
    }

    async fn current_for_user(&self, _user_id: i64, _today: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        self.record("current_for_user").map(|_| Vec::new())
    }

    async fn all_for_user(&self, _user_id: i64) -> Result<Vec<Reservation>, StoreError> {
        self.record("all_for_user").map(|_| Vec::new())
    }

    async fn cancel_slot(&self, _user_id: i64, _date: NaiveDate, _slot: Slot) -> Result<u64, StoreError> {
        self.record("cancel_slot").map(|_| 0)
    }

    async fn cancel_all(&self, _user_id: i64) -> Result<u64, StoreError> {
        self.record("cancel_all").map(|_| 0)
    }

    async fn due_for_reminder(
        &self,
        _from: NaiveDateTime,
        _to: NaiveDateTime,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.record("due_for_reminder").map(|_| Vec::new())
    }

    async fn mark_reminded(&self, _id: i64, _at: NaiveDateTime) -> Result<(), StoreError> {
        self.record("mark_reminded")
    }
}

fn controller(mode: Mode) -> ConversationController<RecordingStore> {
    let now = NaiveDateTime::parse_from_str("2024-06-01 09:00", "%Y-%m-%d %H:%M").unwrap();
    ConversationController::new(
        RecordingStore::new(mode),
        SlotCalendar::default(),
        Arc::new(FixedClock::new(now)),
    )
}

fn user() -> UserIdentity {
    UserIdentity::new(42, "carol")
}

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

#[tokio::test]
async fn test_payment_without_pending_reservation_makes_no_store_call() {
    let controller = controller(Mode::Working);
    let mut session = BookingSession::default();

    let replies = controller.choose_payment(&user(), &mut session, PaymentMethod::Cafe).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, RESERVATION_MISSING);
    assert!(controller.store().calls().is_empty());
    assert_eq!(session, BookingSession::default());
}

#[tokio::test]
async fn test_malformed_details_make_no_store_call() {
    let controller = controller(Mode::Working);
    let mut session = BookingSession::default();
    session.choose_date(june(2));
    session.slot_reserved(june(2), Slot::new(12).unwrap(), 1, 42);

    controller.submit_details(&user(), &mut session, "John, Doe").await;

    assert!(controller.store().calls().is_empty());
    assert_eq!(session.step, BookingStep::AwaitingDetails);
}

#[tokio::test]
async fn test_unique_violation_on_create_relists_slots() {
    let controller = controller(Mode::SlotTaken);
    let mut session = BookingSession::default();
    session.choose_date(june(2));

    let replies = controller
        .choose_slot(&user(), &mut session, june(2), Slot::new(12).unwrap())
        .await;

    assert_eq!(replies[0].kind, FeedbackType::Warning);
    assert!(replies[0].text.contains("12:00 on 2024-06-02 has just been taken"));
    assert!(replies[1].actions().count() > 0);
    assert_eq!(session.step, BookingStep::DateChosen);
    assert_eq!(session.selected_date, Some(june(2)));
    assert_eq!(controller.store().calls(), vec!["booked_slots", "create", "booked_slots"]);
}

#[tokio::test]
async fn test_store_failure_on_read_is_generic_error() {
    let controller = controller(Mode::Broken);

    for replies in [
        controller.view_current(&user()).await,
        controller.view_all(&user()).await,
        controller.cancel_prompt(&user()).await,
    ] {
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind, FeedbackType::Error);
        assert_eq!(replies[0].text, GENERIC_FAILURE);
    }
}

#[tokio::test]
async fn test_store_failure_while_listing_keeps_session() {
    let controller = controller(Mode::Broken);
    let mut session = BookingSession::default();

    let replies = controller.choose_date(&user(), &mut session, june(3)).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, GENERIC_FAILURE);
    assert_eq!(session, BookingSession::default());
}

#[tokio::test]
async fn test_cancel_all_with_broken_store_keeps_session() {
    let controller = controller(Mode::Broken);
    let mut session = BookingSession::default();
    session.choose_date(june(2));
    session.slot_reserved(june(2), Slot::new(12).unwrap(), 1, 42);
    let before = session.clone();

    let replies = controller.cancel_all(&user(), &mut session).await;

    assert_eq!(replies[0].text, GENERIC_FAILURE);
    assert_eq!(session, before);
}

#[tokio::test]
async fn test_premature_or_foreign_payment_makes_no_store_call() {
    let controller = controller(Mode::Working);
    let mut session = BookingSession::default();
    session.choose_date(june(2));
    session.slot_reserved(june(2), Slot::new(12).unwrap(), 1, 42);

    let replies = controller.choose_payment(&user(), &mut session, PaymentMethod::Online).await;
    assert!(replies[0].text.contains("send your details first"));

    session.details_collected("Carol".to_string(), "Jones".to_string(), "0671234567".to_string());
    let stranger = UserIdentity::new(7, "dave");
    let replies = controller.choose_payment(&stranger, &mut session, PaymentMethod::Online).await;
    assert!(replies[0].text.contains("started by someone else"));

    assert!(controller.store().calls().is_empty());
    assert_eq!(session.step, BookingStep::AwaitingPayment);
}
