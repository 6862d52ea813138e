use crate::booking::reply::Reply;
use crate::utils::markdown::escape_markdown;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};

/// Feedback types for different reply outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
    /// Asks the user to do something next.
    Prompt,
}

impl FeedbackType {
    pub fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
            FeedbackType::Prompt => "👉",
        }
    }
}

/// MarkdownV2 body of a reply, prefixed with its feedback emoji.
pub fn format_reply_text(reply: &Reply) -> String {
    format!("{} {}", reply.kind.emoji(), escape_markdown(&reply.text))
}

pub fn reply_keyboard(reply: &Reply) -> Option<InlineKeyboardMarkup> {
    if reply.choices.is_empty() {
        return None;
    }

    let rows = reply.choices.iter().map(|row| {
        row.iter()
            .map(|choice| InlineKeyboardButton::callback(choice.label.clone(), choice.action.encode()))
            .collect::<Vec<_>>()
    });

    Some(InlineKeyboardMarkup::new(rows))
}

/// Delivers controller replies to one chat
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Send one reply, with its keyboard if it has choices
    pub async fn send(&self, reply: &Reply) -> ResponseResult<Message> {
        let request = self
            .bot
            .send_message(self.chat_id, format_reply_text(reply))
            .parse_mode(ParseMode::MarkdownV2);

        match reply_keyboard(reply) {
            Some(keyboard) => request.reply_markup(keyboard).await,
            None => request.await,
        }
    }

    pub async fn send_all(&self, replies: &[Reply]) -> ResponseResult<()> {
        for reply in replies {
            self.send(reply).await?;
        }
        Ok(())
    }

    /// Replace the text of the message whose keyboard was used, then send
    /// the remaining replies as new messages.
    ///
    /// The first reply becomes the edited text; its own keyboard, if any, is
    /// attached to the edited message. When Telegram refuses the edit (the
    /// text did not change, or the message is too old) every reply is sent
    /// as a new message instead.
    pub async fn edit_then_send(&self, message_id: MessageId, replies: &[Reply]) -> ResponseResult<()> {
        let Some((first, rest)) = replies.split_first() else {
            return Ok(());
        };

        let request = self
            .bot
            .edit_message_text(self.chat_id, message_id, format_reply_text(first))
            .parse_mode(ParseMode::MarkdownV2);

        let edited = match reply_keyboard(first) {
            Some(keyboard) => request.reply_markup(keyboard).await,
            None => request.await,
        };

        if let Err(e) = edited {
            tracing::warn!("Could not edit message {} in chat {}: {}", message_id.0, self.chat_id.0, e);
            return self.send_all(replies).await;
        }

        self.send_all(rest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::reply::Choice;
    use crate::bot::callback_data::CallbackData;
    use crate::database::models::PaymentMethod;

    #[test]
    fn test_feedback_type_emojis() {
        assert_eq!(FeedbackType::Success.emoji(), "✅");
        assert_eq!(FeedbackType::Warning.emoji(), "⚠️");
        assert_eq!(FeedbackType::Error.emoji(), "❌");
        assert_eq!(FeedbackType::Info.emoji(), "ℹ️");
        assert_eq!(FeedbackType::Prompt.emoji(), "👉");
    }

    #[test]
    fn test_reply_text_is_escaped() {
        let reply = Reply::success("Reservation confirmed for 2024-06-01 at 14:00!");
        assert_eq!(
            format_reply_text(&reply),
            "✅ Reservation confirmed for 2024\\-06\\-01 at 14:00\\!"
        );
    }

    #[test]
    fn test_keyboard_only_for_replies_with_choices() {
        assert!(reply_keyboard(&Reply::info("No reservations found.")).is_none());

        let reply = Reply::prompt("How would you like to pay?").with_choices(vec![vec![
            Choice::new("Pay Online", CallbackData::Payment(PaymentMethod::Online)),
            Choice::new("Pay at Cafe", CallbackData::Payment(PaymentMethod::Cafe)),
        ]]);
        let keyboard = reply_keyboard(&reply).unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
        assert_eq!(keyboard.inline_keyboard[0][1].text, "Pay at Cafe");
    }
}
