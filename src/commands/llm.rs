use anyhow::{Result, bail};

use crate::llm;
use crate::utils::ask_yn;

/// `set` is `Some(None)` when `--set` is passed without a value, in which
/// case the key is read from a hidden prompt.
pub async fn run(set: Option<Option<String>>, clear: bool, test: bool) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        let key = match key {
            Some(key) => key,
            None => llm::prompt_for_api_key()?,
        };
        if key.trim().is_empty() {
            bail!("No API key entered; nothing was stored.");
        }
        llm::store_api_key(&key)?;
        println!("Stored OpenAI API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        if ask_yn("This removes the stored OpenAI API key.")? {
            if llm::clear_api_key()? {
                println!("Removed the stored OpenAI API key.");
            } else {
                println!("No OpenAI API key found in the auth file.");
            }
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key().await?;
        println!("OpenAI API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
