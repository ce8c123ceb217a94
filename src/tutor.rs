use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::TrainerError;
use crate::llm::prompts::{EXPLANATION_SYSTEM_PROMPT, QUIZ_SYSTEM_PROMPT};
use crate::llm::{
    CompletionClient, CompletionOptions, OpenAiCompletionClient, explanation_prompt, quiz_prompt,
};
use crate::quiz::{QuizQuestion, parse_quiz};
use crate::topic::Topic;

/// Pipeline context for AI-backed actions. Without a client every action
/// fails with `ConfigurationMissing` before anything is sent.
#[derive(Clone)]
pub struct Tutor {
    client: Option<Arc<dyn CompletionClient>>,
}

impl Tutor {
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    pub fn from_configured_key(model: &str) -> Self {
        match OpenAiCompletionClient::from_configured_key(model) {
            Ok(client) => Self::new(Some(Arc::new(client))),
            Err(err) => {
                warn!(%err, "AI features disabled");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&Arc<dyn CompletionClient>, TrainerError> {
        self.client.as_ref().ok_or(TrainerError::ConfigurationMissing)
    }

    pub async fn fetch_explanation(&self, topic: &Topic) -> Result<String, TrainerError> {
        let client = self.client()?;
        debug!(topic = topic.id, "requesting explanation");
        let text = client
            .complete(
                EXPLANATION_SYSTEM_PROMPT,
                &explanation_prompt(topic),
                CompletionOptions::default(),
            )
            .await?;
        if text.trim().is_empty() {
            return Err(TrainerError::service("the model returned an empty explanation"));
        }
        info!(topic = topic.id, chars = text.len(), "explanation received");
        Ok(text)
    }

    pub async fn generate_quiz(&self, topic: &Topic) -> Result<Vec<QuizQuestion>, TrainerError> {
        let client = self.client()?;
        debug!(topic = topic.id, "requesting quiz");
        let raw = client
            .complete(
                QUIZ_SYSTEM_PROMPT,
                &quiz_prompt(topic),
                CompletionOptions::json(),
            )
            .await?;
        let questions = parse_quiz(&raw)?;
        info!(topic = topic.id, questions = questions.len(), "quiz received");
        Ok(questions)
    }
}
