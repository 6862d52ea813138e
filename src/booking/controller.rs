//! The booking conversation: date → slot → personal details → payment.
//!
//! Every entry point takes the caller's identity and, where the flow needs
//! it, the caller's [`BookingSession`]. Entry points never fail: problems are
//! turned into replies and the session is left as it was, so the transport
//! layer only has to deliver the returned [`Reply`] list and persist the
//! session afterwards.

use crate::booking::calendar::SlotCalendar;
use crate::booking::error::BookingError;
use crate::booking::reply::{Choice, Reply};
use crate::booking::session::{BookingSession, BookingStep};
use crate::booking::slot::Slot;
use crate::bot::callback_data::CallbackData;
use crate::database::models::{NewReservation, PaymentMethod, PaymentStatus, PaymentUpdate, Reservation};
use crate::database::store::{ReservationStore, StoreError};
use crate::services::clock::Clock;
use crate::utils::datetime::format_date_label;
use crate::utils::logging::{log_action_rejected, log_action_start, log_transition};
use crate::utils::validation::parse_personal_details;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use uuid::Uuid;

const SLOTS_PER_ROW: usize = 3;
const DETAILS_FORMAT: &str = "Name, Surname, Phone Number";

/// Who is talking to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: i64,
    /// Username, or first name for users without one.
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

pub struct ConversationController<S> {
    store: S,
    calendar: SlotCalendar,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

type Outcome = Result<Vec<Reply>, BookingError>;

impl<S: ReservationStore> ConversationController<S> {
    pub fn new(store: S, calendar: SlotCalendar, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            calendar,
            clock,
            session_ttl: Duration::minutes(120),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn start(&self) -> Vec<Reply> {
        vec![Reply::info(
            "Welcome to the Holy Coffee playroom bot ✨ Use /select_date to book the playroom 🚪",
        )]
    }

    /// Offers the bookable dates. Always allowed; discards any booking in progress.
    pub async fn select_date(&self, user: &UserIdentity, session: &mut BookingSession) -> Vec<Reply> {
        log_action_start("select_date", &user.display_name, user.user_id, None);
        let (now, before) = self.resume(user, session);

        session.reset();
        let dates = self.calendar.dates(now);
        let choices = dates
            .iter()
            .map(|date| vec![Choice::new(format_date_label(*date), CallbackData::Date(*date))])
            .collect();

        let outcome = Ok(vec![Reply::prompt("Choose a date for your booking 📆").with_choices(choices)]);
        self.finish("select_date", user, session, before, now, outcome)
    }

    /// Records the chosen date and lists its free slots.
    pub async fn choose_date(&self, user: &UserIdentity, session: &mut BookingSession, date: NaiveDate) -> Vec<Reply> {
        log_action_start("choose_date", &user.display_name, user.user_id, Some(&date.to_string()));
        let (now, before) = self.resume(user, session);
        let outcome = self.try_choose_date(session, date, now).await;
        self.finish("choose_date", user, session, before, now, outcome)
    }

    /// Lists free slots for the date already in the session.
    pub async fn list_slots(&self, user: &UserIdentity, session: &mut BookingSession) -> Vec<Reply> {
        log_action_start("list_slots", &user.display_name, user.user_id, None);
        let (now, before) = self.resume(user, session);
        let outcome = self.try_list_slots(session, now).await;
        self.finish("list_slots", user, session, before, now, outcome)
    }

    /// Reserves `slot` on `date` and asks for personal details.
    pub async fn choose_slot(
        &self,
        user: &UserIdentity,
        session: &mut BookingSession,
        date: NaiveDate,
        slot: Slot,
    ) -> Vec<Reply> {
        let details = format!("{date} {slot}");
        log_action_start("choose_slot", &user.display_name, user.user_id, Some(&details));
        let (now, before) = self.resume(user, session);
        let outcome = self.try_choose_slot(user, session, date, slot, now).await;
        self.finish("choose_slot", user, session, before, now, outcome)
    }

    /// Routes free text: only a session waiting for details accepts it.
    pub async fn handle_text(&self, user: &UserIdentity, session: &mut BookingSession, text: &str) -> Vec<Reply> {
        self.submit_details(user, session, text).await
    }

    /// Parses `Name, Surname, Phone` and stores it on the pending reservation.
    pub async fn submit_details(&self, user: &UserIdentity, session: &mut BookingSession, text: &str) -> Vec<Reply> {
        log_action_start("submit_details", &user.display_name, user.user_id, None);
        let (now, before) = self.resume(user, session);
        let outcome = self.try_submit_details(user, session, text).await;
        self.finish("submit_details", user, session, before, now, outcome)
    }

    /// Records how the user will pay for the pending reservation.
    pub async fn choose_payment(
        &self,
        user: &UserIdentity,
        session: &mut BookingSession,
        method: PaymentMethod,
    ) -> Vec<Reply> {
        log_action_start("choose_payment", &user.display_name, user.user_id, Some(method.as_str()));
        let (now, before) = self.resume(user, session);
        let outcome = self.try_choose_payment(user, session, method).await;
        self.finish("choose_payment", user, session, before, now, outcome)
    }

    pub async fn view_current(&self, user: &UserIdentity) -> Vec<Reply> {
        log_action_start("view_current", &user.display_name, user.user_id, None);
        let today = self.now().date();
        let outcome = self
            .store
            .current_for_user(user.user_id, today)
            .await
            .map(|reservations| vec![list_reservations("Current reservations:", &reservations)])
            .map_err(BookingError::from);
        self.recover("view_current", user, outcome)
    }

    pub async fn view_all(&self, user: &UserIdentity) -> Vec<Reply> {
        log_action_start("view_all", &user.display_name, user.user_id, None);
        let outcome = self
            .store
            .all_for_user(user.user_id)
            .await
            .map(|reservations| vec![list_reservations("Your reservation history:", &reservations)])
            .map_err(BookingError::from);
        self.recover("view_all", user, outcome)
    }

    /// Offers the user's current reservations for cancellation.
    pub async fn cancel_prompt(&self, user: &UserIdentity) -> Vec<Reply> {
        log_action_start("cancel_prompt", &user.display_name, user.user_id, None);
        let today = self.now().date();
        let outcome = self
            .store
            .current_for_user(user.user_id, today)
            .await
            .map(|reservations| {
                if reservations.is_empty() {
                    return vec![Reply::info("No reservations found.")];
                }
                let choices = reservations
                    .iter()
                    .map(|r| {
                        vec![Choice::new(
                            format!("{} at {}", r.date, r.slot),
                            CallbackData::Cancel {
                                date: r.date,
                                slot: r.slot,
                            },
                        )]
                    })
                    .collect();
                vec![Reply::prompt("Select a reservation to cancel:").with_choices(choices)]
            })
            .map_err(BookingError::from);
        self.recover("cancel_prompt", user, outcome)
    }

    /// Deletes one of the user's reservations.
    pub async fn cancel_one(
        &self,
        user: &UserIdentity,
        session: &mut BookingSession,
        date: NaiveDate,
        slot: Slot,
    ) -> Vec<Reply> {
        let details = format!("{date} {slot}");
        log_action_start("cancel_one", &user.display_name, user.user_id, Some(&details));
        let (now, before) = self.resume(user, session);

        let outcome = match self.store.cancel_slot(user.user_id, date, slot).await {
            Ok(0) => Ok(vec![Reply::warning(format!(
                "Failed to cancel reservation for {date} at {slot}. It may not exist."
            ))]),
            Ok(_) => {
                if session.holds(date, slot) {
                    session.reset();
                }
                Ok(vec![Reply::success(format!(
                    "Reservation for {date} at {slot} has been canceled."
                ))])
            }
            Err(e) => Err(BookingError::from(e)),
        };
        self.finish("cancel_one", user, session, before, now, outcome)
    }

    /// Deletes every reservation of the user. Succeeds when there are none.
    pub async fn cancel_all(&self, user: &UserIdentity, session: &mut BookingSession) -> Vec<Reply> {
        log_action_start("cancel_all", &user.display_name, user.user_id, None);
        let (now, before) = self.resume(user, session);

        let outcome = match self.store.cancel_all(user.user_id).await {
            Ok(removed) => {
                tracing::info!("Canceled {} reservation(s) for user {}", removed, user.user_id);
                if session.pending_reservation_id.is_some() {
                    session.reset();
                }
                Ok(vec![Reply::success("Your reservations have been canceled.")])
            }
            Err(e) => Err(BookingError::from(e)),
        };
        self.finish("cancel_all", user, session, before, now, outcome)
    }

    /// Answers a callback payload that could not be decoded.
    pub fn reject_payload(&self, user: &UserIdentity, payload: &str) -> Vec<Reply> {
        let err = BookingError::InvalidInput(format!(
            "Invalid selection: {payload}. Unable to process it, please use the latest menu."
        ));
        self.recover("callback", user, Err(err))
    }

    async fn try_choose_date(&self, session: &mut BookingSession, date: NaiveDate, now: NaiveDateTime) -> Outcome {
        if !self.calendar.is_offerable_date(date, now) {
            return Err(BookingError::InvalidInput(format!(
                "{date} is not available for booking. Please pick a date from /select_date."
            )));
        }

        let slots = self.offerable_slots(date, now).await?;
        session.choose_date(date);

        Ok(vec![
            Reply::success(format!("Date selected: {date}")),
            slot_menu(date, &slots),
        ])
    }

    async fn try_list_slots(&self, session: &BookingSession, now: NaiveDateTime) -> Outcome {
        let date = session.selected_date.ok_or_else(|| {
            BookingError::Precondition("Please choose a date first with /select_date 🙏".to_string())
        })?;

        if !self.calendar.is_offerable_date(date, now) {
            return Err(BookingError::Precondition(format!(
                "{date} is no longer available. Please choose another date with /select_date."
            )));
        }

        let slots = self.offerable_slots(date, now).await?;
        Ok(vec![slot_menu(date, &slots)])
    }

    async fn try_choose_slot(
        &self,
        user: &UserIdentity,
        session: &mut BookingSession,
        date: NaiveDate,
        slot: Slot,
        now: NaiveDateTime,
    ) -> Outcome {
        if !self.calendar.is_offerable_date(date, now) {
            return Err(BookingError::InvalidInput(format!(
                "{date} is not available for booking. Please pick a date from /select_date."
            )));
        }

        if session.step != BookingStep::DateChosen || session.selected_date != Some(date) {
            session.choose_date(date);
        }

        let slots = self.offerable_slots(date, now).await?;
        if !slots.contains(&slot) {
            return Ok(slot_taken(date, slot, &slots));
        }

        let new = NewReservation {
            date,
            slot,
            user_id: user.user_id,
            username: Some(user.display_name.clone()),
            created_at: now,
        };

        match self.store.create(new).await {
            Ok(reservation) => {
                session.slot_reserved(date, slot, reservation.id, user.user_id);
                Ok(vec![
                    Reply::success(format!("Reservation confirmed for {date} at {slot}!")),
                    details_prompt(),
                ])
            }
            Err(StoreError::SlotTaken { .. }) => {
                let slots = self.offerable_slots(date, now).await?;
                Ok(slot_taken(date, slot, &slots))
            }
            Err(e) => {
                tracing::error!("Booking {} {} for user {} failed: {}", date, slot, user.user_id, e);
                Ok(vec![Reply::error(format!(
                    "Sorry, we could not book {slot} on {date}. Please try again."
                ))])
            }
        }
    }

    async fn try_submit_details(&self, user: &UserIdentity, session: &mut BookingSession, text: &str) -> Outcome {
        if session.step != BookingStep::AwaitingDetails {
            return Err(BookingError::Precondition(
                "No input is expected right now. Use /select_date to book the playroom.".to_string(),
            ));
        }
        ensure_owner(user, session)?;

        let details = parse_personal_details(text).map_err(|e| {
            BookingError::InvalidInput(format!("Invalid format: {e}.\nPlease reply with:\n{DETAILS_FORMAT}"))
        })?;

        let reservation_id = session.pending_reservation_id.ok_or(BookingError::ReservationMissing)?;

        match self.store.update_details(user.user_id, reservation_id, &details).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                session.reset();
                return Err(BookingError::ReservationMissing);
            }
            Err(e) => return Err(e.into()),
        }

        session.details_collected(details.name, details.surname, details.phone);

        Ok(vec![
            Reply::success("Thank you! Your details have been saved successfully. 😊"),
            payment_prompt(),
        ])
    }

    async fn try_choose_payment(&self, user: &UserIdentity, session: &mut BookingSession, method: PaymentMethod) -> Outcome {
        let reservation_id = session.pending_reservation_id.ok_or(BookingError::ReservationMissing)?;
        ensure_owner(user, session)?;
        if !matches!(session.step, BookingStep::AwaitingPayment | BookingStep::PaymentChosen) {
            return Err(BookingError::Precondition(format!(
                "Please send your details first:\n{DETAILS_FORMAT}"
            )));
        }

        let update = match method {
            PaymentMethod::Online => PaymentUpdate {
                status: PaymentStatus::Pending,
                method,
                payment_id: Some(format!("PAY-{}", Uuid::new_v4().simple())),
            },
            PaymentMethod::Cafe => PaymentUpdate {
                status: PaymentStatus::Pending,
                method,
                payment_id: None,
            },
        };

        match self.store.update_payment(user.user_id, reservation_id, &update).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                session.reset();
                return Err(BookingError::ReservationMissing);
            }
            Err(e) => return Err(e.into()),
        }

        session.payment_chosen(method);

        let reply = match (method, update.payment_id) {
            (PaymentMethod::Online, Some(payment_id)) => Reply::success(format!(
                "Online payment selected. Please pay at the link sent by the cafe and quote \
                 payment reference {payment_id}. Your reservation stays pending until the payment is confirmed."
            )),
            _ => Reply::success("You have chosen to pay at the cafe. Please arrive on time. 😊"),
        };
        Ok(vec![reply])
    }

    async fn offerable_slots(&self, date: NaiveDate, now: NaiveDateTime) -> Result<Vec<Slot>, BookingError> {
        let booked = self.store.booked_slots(date).await?;
        Ok(self.calendar.slots(date, now, &booked))
    }

    /// Expires a stale session and returns the current time with the step
    /// the action starts from.
    fn resume(&self, user: &UserIdentity, session: &mut BookingSession) -> (NaiveDateTime, BookingStep) {
        let now = self.now();
        if session.expire_if_stale(now, self.session_ttl) {
            tracing::info!("Booking session of user {} expired", user.user_id);
        }
        (now, session.step)
    }

    fn finish(
        &self,
        action: &str,
        user: &UserIdentity,
        session: &mut BookingSession,
        before: BookingStep,
        now: NaiveDateTime,
        outcome: Outcome,
    ) -> Vec<Reply> {
        if outcome.is_ok() {
            session.touch(now);
        }
        log_transition(user.user_id, &before.to_string(), &session.step.to_string());
        self.recover(action, user, outcome)
    }

    fn recover(&self, action: &str, user: &UserIdentity, outcome: Outcome) -> Vec<Reply> {
        match outcome {
            Ok(replies) => replies,
            Err(err) => {
                if err.is_store_failure() {
                    tracing::error!("{} for user {} failed: {}", action, user.user_id, err);
                } else {
                    log_action_rejected(action, user.user_id, &err.to_string());
                }
                vec![err.reply()]
            }
        }
    }
}

fn ensure_owner(user: &UserIdentity, session: &BookingSession) -> Result<(), BookingError> {
    if session.is_owned_by_other(user.user_id) {
        return Err(BookingError::Precondition(
            "This booking was started by someone else. Use /select_date to start your own.".to_string(),
        ));
    }
    Ok(())
}

fn slot_menu(date: NaiveDate, slots: &[Slot]) -> Reply {
    if slots.is_empty() {
        return Reply::info(format!(
            "Unfortunately there are no free slots on {date} 😥 Maybe try another date with /select_date?"
        ));
    }

    let choices = slots
        .chunks(SLOTS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|slot| Choice::new(slot.to_string(), CallbackData::Slot { date, slot: *slot }))
                .collect()
        })
        .collect();

    Reply::prompt(format!("Free slots on {date}:")).with_choices(choices)
}

fn slot_taken(date: NaiveDate, slot: Slot, remaining: &[Slot]) -> Vec<Reply> {
    vec![BookingError::SlotUnavailable { date, slot }.reply(), slot_menu(date, remaining)]
}

fn details_prompt() -> Reply {
    Reply::prompt(format!(
        "Please send your details in one message:\n\n1. Name\n2. Surname\n3. Phone Number\n\nFormat:\n{DETAILS_FORMAT}"
    ))
}

fn payment_prompt() -> Reply {
    Reply::prompt("How would you like to pay for your reservation?").with_choices(vec![vec![
        Choice::new("Pay Online 💳", CallbackData::Payment(PaymentMethod::Online)),
        Choice::new("Pay at Cafe ☕", CallbackData::Payment(PaymentMethod::Cafe)),
    ]])
}

fn list_reservations(title: &str, reservations: &[Reservation]) -> Reply {
    if reservations.is_empty() {
        return Reply::info("No reservations found.");
    }

    let lines: Vec<String> = reservations
        .iter()
        .map(|r| {
            let payment = match r.payment_method {
                Some(method) => format!("{}, {}", r.payment_status, method),
                None => r.payment_status.to_string(),
            };
            format!("• {} at {} ({})", r.date, r.slot, payment)
        })
        .collect();

    Reply::info(format!("{title}\n{}", lines.join("\n")))
}
