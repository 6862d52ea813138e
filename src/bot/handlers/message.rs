use super::{user_dialogue, user_identity, Controller, HandlerResult, SessionStorage};
use crate::booking::reply::Reply;
use crate::booking::session::BookingStep;
use crate::bot::commands::Command;
use crate::utils::feedback::CommandFeedback;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    storage: Arc<SessionStorage>,
    controller: Arc<Controller>,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some(user) = msg.from().map(user_identity) else {
        return Ok(());
    };

    let dialogue = user_dialogue(storage, &user);
    let mut session = dialogue.get_or_default().await?;

    let replies = match cmd {
        Command::Help => vec![Reply::info(Command::descriptions().to_string())],
        Command::Start => controller.start(),
        Command::SelectDate => controller.select_date(&user, &mut session).await,
        Command::Reserve => controller.list_slots(&user, &mut session).await,
        Command::ViewMyCurrentReservations => controller.view_current(&user).await,
        Command::ViewMyAllReservations => controller.view_all(&user).await,
        Command::CancelReservation => controller.cancel_prompt(&user).await,
        Command::CancelAllReservations => controller.cancel_all(&user, &mut session).await,
    };

    dialogue.update(session).await?;
    feedback.send_all(&replies).await?;
    Ok(())
}

/// Anything that is not a known command. In group chats only a user who
/// owes their details gets an answer; other chatter is ignored.
pub async fn text_handler(
    bot: Bot,
    msg: Message,
    storage: Arc<SessionStorage>,
    controller: Arc<Controller>,
) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from().map(user_identity)) else {
        return Ok(());
    };
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let dialogue = user_dialogue(storage, &user);
    let mut session = dialogue.get_or_default().await?;

    if !msg.chat.is_private() && session.step != BookingStep::AwaitingDetails {
        return Ok(());
    }

    if text.starts_with('/') {
        let command = text.split_whitespace().next().unwrap_or(text);
        feedback
            .send(&Reply::warning(format!(
                "Unknown command: {command}. Use /help to see all available commands."
            )))
            .await?;
        return Ok(());
    }

    let replies = controller.handle_text(&user, &mut session, text).await;
    dialogue.update(session).await?;

    feedback.send_all(&replies).await?;
    Ok(())
}
