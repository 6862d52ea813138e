use crate::bot::callback_data::CallbackData;
use crate::utils::feedback::FeedbackType;

/// One selectable option attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: CallbackData,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: CallbackData) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A message for the user, independent of how it is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: FeedbackType,
    pub text: String,
    /// Rows of choices, rendered as an inline keyboard.
    pub choices: Vec<Vec<Choice>>,
}

impl Reply {
    pub fn new(kind: FeedbackType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FeedbackType::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(FeedbackType::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(FeedbackType::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(FeedbackType::Error, text)
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(FeedbackType::Prompt, text)
    }

    pub fn with_choices(mut self, choices: Vec<Vec<Choice>>) -> Self {
        self.choices = choices;
        self
    }

    /// Every choice of the reply, row by row.
    pub fn actions(&self) -> impl Iterator<Item = &CallbackData> {
        self.choices.iter().flatten().map(|choice| &choice.action)
    }
}
