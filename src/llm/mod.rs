pub mod client;
pub mod prompts;
pub mod response;
pub mod secrets;

pub use client::{
    CompletionClient, CompletionOptions, DEFAULT_MODEL, OpenAiCompletionClient,
    test_configured_api_key,
};
pub use prompts::{explanation_prompt, quiz_prompt};
pub use secrets::{clear_api_key, prompt_for_api_key, store_api_key};
