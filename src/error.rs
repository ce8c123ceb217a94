use thiserror::Error;

use crate::llm::secrets::API_KEY_ENV;

/// Failures of an AI-backed action. Each one ends the triggering action only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrainerError {
    #[error(
        "No OpenAI API key is configured. Set {API_KEY_ENV} or run `lsc-trainer llm --set <KEY>`."
    )]
    ConfigurationMissing,

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed quiz data: {0}")]
    MalformedQuizData(String),
}

impl TrainerError {
    pub fn service(err: impl std::fmt::Display) -> Self {
        TrainerError::ServiceUnavailable(err.to_string())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        TrainerError::MalformedQuizData(reason.into())
    }
}

/// Rejected quiz-session transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Question {} has not been answered yet", .0 + 1)]
    Unanswered(usize),

    #[error("The quiz has already been submitted")]
    AlreadySubmitted,

    #[error("Option {0} does not exist for this question")]
    NoSuchOption(usize),
}
