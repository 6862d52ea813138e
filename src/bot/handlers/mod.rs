pub mod callback;
pub mod message;

use crate::booking::controller::{ConversationController, UserIdentity};
use crate::booking::session::BookingSession;
use crate::bot::commands::Command;
use crate::database::store::SqliteReservationStore;
use std::sync::Arc;
use teloxide::{
    dispatching::{
        dialogue::{serializer::Json, SqliteStorage},
        UpdateHandler,
    },
    prelude::*,
    types::{ChatId, User},
};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Booking sessions are kept per user in a SQLite file, serialized as JSON.
pub type SessionStorage = SqliteStorage<Json>;
pub type BookingDialogue = Dialogue<BookingSession, SessionStorage>;
pub type Controller = ConversationController<SqliteReservationStore>;

pub struct BotHandler {
    pub controller: Arc<Controller>,
}

impl BotHandler {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }

    /// Expects an `Arc<SessionStorage>` among the dispatcher dependencies.
    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let for_commands = self.controller.clone();
        let for_text = self.controller.clone();
        let for_callbacks = self.controller.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command, storage: Arc<SessionStorage>| {
                        let controller = for_commands.clone();
                        async move { message::command_handler(bot, msg, cmd, storage, controller).await }
                    }),
            )
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message, storage: Arc<SessionStorage>| {
                    let controller = for_text.clone();
                    async move { message::text_handler(bot, msg, storage, controller).await }
                }),
            )
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, storage: Arc<SessionStorage>| {
                    let controller = for_callbacks.clone();
                    async move { callback::callback_handler(bot, q, storage, controller).await }
                },
            ))
    }
}

/// Sessions are keyed by the user, not the chat, so members of a group
/// chat never share a booking in progress.
pub fn user_dialogue(storage: Arc<SessionStorage>, user: &UserIdentity) -> BookingDialogue {
    BookingDialogue::new(storage, ChatId(user.user_id))
}

/// Telegram username, falling back to the first name.
pub fn user_identity(user: &User) -> UserIdentity {
    let display_name = user.username.clone().unwrap_or_else(|| user.first_name.clone());
    UserIdentity::new(user.id.0 as i64, display_name)
}
