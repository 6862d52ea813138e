use crate::database::models::Reservation;
use crate::database::store::{ReservationStore, StoreError};
use crate::services::clock::Clock;
use crate::utils::logging::log_system_event;
use chrono::{Duration, NaiveDateTime};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Every minute, at second zero.
const SWEEP_SCHEDULE: &str = "0 * * * * *";

pub struct ReminderService<S> {
    bot: Bot,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    lead: Duration,
    scheduler: JobScheduler,
}

impl<S: ReservationStore + 'static> ReminderService<S> {
    pub async fn new(
        bot: Bot,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        lead: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            store,
            clock,
            lead,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bot = self.bot.clone();
        let store = self.store.clone();
        let clock = self.clock.clone();
        let lead = self.lead;

        let sweep = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _l| {
            let bot = bot.clone();
            let store = store.clone();
            let now = clock.now();
            Box::pin(async move {
                if let Err(e) = send_due_reminders(&bot, store.as_ref(), now, lead).await {
                    tracing::error!("Reminder sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep).await?;
        self.scheduler.start().await?;

        log_system_event(
            "reminder_service_started",
            Some(&format!("lead {} min", self.lead.num_minutes())),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// Reservations starting within `(now, now + lead]` that nobody reminded yet.
pub async fn collect_due_reminders<S: ReservationStore + ?Sized>(
    store: &S,
    now: NaiveDateTime,
    lead: Duration,
) -> Result<Vec<Reservation>, StoreError> {
    store.due_for_reminder(now, now + lead).await
}

pub fn reminder_text(reservation: &Reservation) -> String {
    format!(
        "⏰ Reminder: your playroom reservation is at {}. Please arrive on time!",
        reservation.slot
    )
}

async fn send_due_reminders<S: ReservationStore + ?Sized>(
    bot: &Bot,
    store: &S,
    now: NaiveDateTime,
    lead: Duration,
) -> Result<usize, StoreError> {
    deliver_due_reminders(store, now, lead, |chat_id, text| async move {
        bot.send_message(chat_id, text).await.map(|_| ())
    })
    .await
}

/// Hands every due reminder to `deliver` and stamps the delivered ones.
/// A failed delivery or stamp is logged and the sweep moves on; a reminder
/// whose stamp failed may be sent again on the next sweep.
///
/// Returns how many reminders were delivered.
pub async fn deliver_due_reminders<S, F, Fut, E>(
    store: &S,
    now: NaiveDateTime,
    lead: Duration,
    mut deliver: F,
) -> Result<usize, StoreError>
where
    S: ReservationStore + ?Sized,
    F: FnMut(ChatId, String) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let due = collect_due_reminders(store, now, lead).await?;
    let mut sent = 0;

    for reservation in due {
        // Private chats share their id with the user.
        let chat_id = ChatId(reservation.user_id);
        if let Err(e) = deliver(chat_id, reminder_text(&reservation)).await {
            tracing::error!(
                "Failed to send reminder for reservation {} to user {}: {}",
                reservation.id,
                reservation.user_id,
                e
            );
            continue;
        }

        sent += 1;
        tracing::info!(
            "Sent reminder for reservation {} ({} {}) to user {}",
            reservation.id,
            reservation.date,
            reservation.slot,
            reservation.user_id
        );

        if let Err(e) = store.mark_reminded(reservation.id, now).await {
            tracing::error!("Failed to mark reservation {} as reminded: {}", reservation.id, e);
        }
    }

    Ok(sent)
}
