use anyhow::{Context, Result, anyhow};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use tracing::debug;

use crate::error::TrainerError;
use crate::llm::secrets::API_KEY_ENV;

use super::response::request_single_text_response;
use super::secrets::{ApiKeySource, get_api_key_from_sources};

pub const DEFAULT_MODEL: &str = "gpt-5-nano";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Ask the provider for JSON only. Not a guarantee.
    pub expect_json: bool,
}

impl CompletionOptions {
    pub fn json() -> Self {
        Self { expect_json: true }
    }
}

/// One request, one response. Implementations must not retry or cache.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, TrainerError>;
}

pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: initialize_client(api_key),
            model: model.into(),
        }
    }

    /// Builds a client from the configured key, or `ConfigurationMissing`
    /// when no key is available.
    pub fn from_configured_key(model: impl Into<String>) -> Result<Self, TrainerError> {
        let lookup = get_api_key_from_sources().map_err(|err| {
            debug!(error = %format!("{err:#}"), "API key lookup failed");
            TrainerError::ConfigurationMissing
        })?;
        let key = lookup.api_key.ok_or(TrainerError::ConfigurationMissing)?;
        Ok(Self::new(&key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, TrainerError> {
        debug!(model = %self.model, expect_json = options.expect_json, "sending completion request");
        request_single_text_response(
            &self.client,
            &self.model,
            system_prompt,
            prompt,
            options.expect_json,
        )
        .await
        .map_err(|err| TrainerError::service(format!("{err:#}")))
    }
}

pub async fn test_configured_api_key() -> Result<ApiKeySource> {
    let lookup = get_api_key_from_sources()?;
    let (key, source) = lookup.api_key.zip(lookup.source).ok_or_else(|| {
        anyhow!(
            "LLM features are disabled. To enable, set {} or run `lsc-trainer llm --set <KEY>`.",
            API_KEY_ENV
        )
    })?;
    let client = initialize_client(&key);
    healthcheck_client(&client).await?;
    Ok(source)
}

fn initialize_client(api_key: &str) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new().with_api_key(api_key);
    Client::with_config(config)
}

async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with OpenAI")?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Replays canned replies in order and counts the calls it receives.
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, TrainerError>>>,
        calls: AtomicUsize,
        last_options: Mutex<Option<CompletionOptions>>,
        last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedClient {
        pub fn replying(replies: Vec<Result<String, TrainerError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_options(&self) -> Option<CompletionOptions> {
            *self.last_options.lock().unwrap()
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.last_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _system_prompt: &str,
            prompt: &str,
            options: CompletionOptions,
        ) -> Result<String, TrainerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock().unwrap() = Some(options);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TrainerError::service("no scripted reply left")))
        }
    }
}
