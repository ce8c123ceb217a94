use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};

const MAX_OUTPUT_TOKENS: u32 = 5000;

const JSON_ONLY_INSTRUCTION: &str =
    "Respond with raw JSON only. Do not add prose, comments, or explanations.";

pub async fn request_single_text_response(
    client: &Client<OpenAIConfig>,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    expect_json: bool,
) -> Result<String> {
    let system_prompt = system_instructions(system_prompt, expect_json);
    let request = CreateResponseArgs::default()
        .model(model)
        .max_output_tokens(MAX_OUTPUT_TOKENS)
        .input(vec![
            InputMessage {
                role: InputRole::System,
                content: vec![system_prompt.as_str().into()],
                status: None,
            },
            InputMessage {
                role: InputRole::User,
                content: vec![user_prompt.into()],
                status: None,
            },
        ])
        .build()?;

    let response = client
        .responses()
        .create(request)
        .await
        .with_context(|| "Failed to get response from LLM")?;

    for item in response.output {
        if let OutputItem::Message(message) = item {
            for content in message.content {
                if let OutputMessageContent::OutputText(text) = content {
                    let trimmed = text.text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Ok(trimmed.to_string());
                }
            }
        }
    }

    bail!("No text output returned from model")
}

fn system_instructions(system_prompt: &str, expect_json: bool) -> String {
    let base = system_prompt.trim();
    if expect_json {
        format!("{base}\n{JSON_ONLY_INSTRUCTION}")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_appends_instruction() {
        let plain = system_instructions("\nYou write quizzes.\n", false);
        assert_eq!(plain, "You write quizzes.");

        let json = system_instructions("\nYou write quizzes.\n", true);
        assert!(json.starts_with("You write quizzes.\n"));
        assert!(json.ends_with(JSON_ONLY_INSTRUCTION));
    }
}
