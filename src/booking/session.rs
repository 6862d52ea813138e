use crate::booking::slot::Slot;
use crate::database::models::PaymentMethod;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a user currently is in the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookingStep {
    #[default]
    Idle,
    DateChosen,
    /// A reservation row exists; waiting for `Name, Surname, Phone`.
    AwaitingDetails,
    AwaitingPayment,
    PaymentChosen,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStep::Idle => "idle",
            BookingStep::DateChosen => "date_chosen",
            BookingStep::AwaitingDetails => "awaiting_details",
            BookingStep::AwaitingPayment => "awaiting_payment",
            BookingStep::PaymentChosen => "payment_chosen",
        };
        f.write_str(name)
    }
}

/// Per-user progress through one booking attempt.
///
/// Persisted between updates by the dialogue storage, so it must stay
/// serializable. A fresh default session is `Idle` with nothing collected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingSession {
    pub step: BookingStep,
    pub selected_date: Option<NaiveDate>,
    pub selected_slot: Option<Slot>,
    pub pending_reservation_id: Option<i64>,
    /// User who created the pending reservation.
    #[serde(default)]
    pub owner_id: Option<i64>,
    pub collected_name: Option<String>,
    pub collected_surname: Option<String>,
    pub collected_phone: Option<String>,
    pub payment_choice: Option<PaymentMethod>,
    pub updated_at: Option<NaiveDateTime>,
}

impl BookingSession {
    /// Drops the session when it has been idle for longer than `ttl`.
    /// Returns true when a reset happened.
    pub fn expire_if_stale(&mut self, now: NaiveDateTime, ttl: Duration) -> bool {
        match self.updated_at {
            Some(updated_at) if now - updated_at > ttl => {
                *self = BookingSession::default();
                true
            }
            _ => false,
        }
    }

    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = Some(now);
    }

    pub fn choose_date(&mut self, date: NaiveDate) {
        *self = BookingSession {
            step: BookingStep::DateChosen,
            selected_date: Some(date),
            updated_at: self.updated_at,
            ..BookingSession::default()
        };
    }

    pub fn slot_reserved(&mut self, date: NaiveDate, slot: Slot, reservation_id: i64, owner_id: i64) {
        self.step = BookingStep::AwaitingDetails;
        self.owner_id = Some(owner_id);
        self.selected_date = Some(date);
        self.selected_slot = Some(slot);
        self.pending_reservation_id = Some(reservation_id);
    }

    pub fn details_collected(&mut self, name: String, surname: String, phone: String) {
        self.step = BookingStep::AwaitingPayment;
        self.collected_name = Some(name);
        self.collected_surname = Some(surname);
        self.collected_phone = Some(phone);
    }

    pub fn payment_chosen(&mut self, method: PaymentMethod) {
        self.step = BookingStep::PaymentChosen;
        self.payment_choice = Some(method);
    }

    /// True when the pending reservation was made by someone other than `user_id`.
    pub fn is_owned_by_other(&self, user_id: i64) -> bool {
        self.owner_id.is_some_and(|owner| owner != user_id)
    }

    /// True when this session's in-flight reservation is the given one.
    pub fn holds(&self, date: NaiveDate, slot: Slot) -> bool {
        self.pending_reservation_id.is_some()
            && self.selected_date == Some(date)
            && self.selected_slot == Some(slot)
    }

    pub fn reset(&mut self) {
        let updated_at = self.updated_at;
        *self = BookingSession::default();
        self.updated_at = updated_at;
    }
}
