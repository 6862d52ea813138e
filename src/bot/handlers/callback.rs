use super::{user_dialogue, user_identity, Controller, HandlerResult, SessionStorage};
use crate::bot::callback_data::CallbackData;
use crate::utils::feedback::CommandFeedback;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatId;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    storage: Arc<SessionStorage>,
    controller: Arc<Controller>,
) -> HandlerResult {
    let user = user_identity(&q.from);
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let chat_id = q.message.as_ref().map_or(ChatId(user.user_id), |menu| menu.chat.id);
    tracing::info!(
        "Callback received: '{}' from user {} ({}) in chat {}",
        data,
        user.display_name,
        user.user_id,
        chat_id.0
    );

    let dialogue = user_dialogue(storage, &user);
    let mut session = dialogue.get_or_default().await?;

    let replies = match CallbackData::parse(data) {
        Ok(CallbackData::Date(date)) => controller.choose_date(&user, &mut session, date).await,
        Ok(CallbackData::Slot { date, slot }) => controller.choose_slot(&user, &mut session, date, slot).await,
        Ok(CallbackData::Payment(method)) => controller.choose_payment(&user, &mut session, method).await,
        Ok(CallbackData::Cancel { date, slot }) => controller.cancel_one(&user, &mut session, date, slot).await,
        Err(e) => {
            tracing::warn!("{}", e);
            controller.reject_payload(&user, data)
        }
    };

    dialogue.update(session).await?;

    let feedback = CommandFeedback::new(bot, chat_id);
    match q.message {
        Some(menu) => feedback.edit_then_send(menu.id, &replies).await?,
        None => feedback.send_all(&replies).await?,
    }
    Ok(())
}
