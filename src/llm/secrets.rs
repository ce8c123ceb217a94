use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "LSC_TRAINER_OPENAI_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const OPENAI_PROVIDER: &str = "openai";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Default)]
pub struct ApiKeyLookup {
    pub api_key: Option<String>,
    pub source: Option<ApiKeySource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// The JSON auth file holding provider keys, one entry per provider.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::at(get_data_dir()?.join(AUTH_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_key(&self) -> Result<Option<String>> {
        let Some(auth) = self.read()? else {
            return Ok(None);
        };
        Ok(auth
            .providers
            .get(OPENAI_PROVIDER)
            .map(|entry| entry.key.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    pub fn store_key(&self, api_key: &str) -> Result<()> {
        let trimmed = trim_line(api_key).with_context(|| "Cannot store an empty API key")?;
        let mut auth = self.read()?.unwrap_or_default();
        auth.providers.insert(
            OPENAI_PROVIDER.to_string(),
            ProviderAuth {
                key: trimmed.to_string(),
            },
        );
        self.write(&auth)
    }

    /// Returns whether a key was removed. The file goes away once empty.
    pub fn clear_key(&self) -> Result<bool> {
        let Some(mut auth) = self.read()? else {
            return Ok(false);
        };
        if auth.providers.remove(OPENAI_PROVIDER).is_none() {
            return Ok(false);
        }

        if auth.providers.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!(
                    "Failed to remove empty auth file at {}",
                    self.path.display()
                )
            })?;
            return Ok(true);
        }

        self.write(&auth)?;
        Ok(true)
    }

    fn read(&self) -> Result<Option<AuthFile>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_auth_contents(&contents, &self.path).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read auth file at {}", self.path.display())),
        }
    }

    fn write(&self, auth: &AuthFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(auth)?;
        fs::write(&self.path, format!("{contents}\n"))
            .with_context(|| format!("Failed to write auth file at {}", self.path.display()))
    }
}

fn parse_auth_contents(contents: &str, path: &Path) -> Result<AuthFile> {
    if contents.trim().is_empty() {
        return Ok(AuthFile::default());
    }
    serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))
}

/// Environment variable first, then the auth file.
pub fn lookup_api_key(env_value: Option<String>, store: &CredentialStore) -> Result<ApiKeyLookup> {
    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return Ok(ApiKeyLookup {
            api_key: Some(value.trim().to_string()),
            source: Some(ApiKeySource::Environment),
        });
    }

    match store.load_key()? {
        Some(key) => Ok(ApiKeyLookup {
            api_key: Some(key),
            source: Some(ApiKeySource::AuthFile),
        }),
        None => {
            debug!(path = %store.path().display(), "no API key configured");
            Ok(ApiKeyLookup::default())
        }
    }
}

pub fn get_api_key_from_sources() -> Result<ApiKeyLookup> {
    lookup_api_key(env::var(API_KEY_ENV).ok(), &CredentialStore::default_location()?)
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    CredentialStore::default_location()?.store_key(api_key)
}

pub fn clear_api_key() -> Result<bool> {
    CredentialStore::default_location()?.clear_key()
}

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://platform.openai.com/account/api-keys) to enable explanations and quizzes. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenAI API key")
    );
    let raw_password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    let password = strip_controls_and_escapes(&raw_password);
    Ok(password.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_reads_as_no_providers() {
        let parsed = parse_auth_contents("   \n", Path::new("auth.json")).unwrap();
        assert!(parsed.providers.is_empty());
    }

    #[test]
    fn missing_file_has_no_key() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("auth.json"));
        assert_eq!(store.load_key().unwrap(), None);
        assert!(!store.clear_key().unwrap());
    }

    #[test]
    fn store_overwrites_and_clear_removes_file() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("auth.json"));

        store.store_key("fake_key").unwrap();
        store.store_key("  real_key \n").unwrap();
        assert_eq!(store.load_key().unwrap().as_deref(), Some("real_key"));

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.ends_with('\n'));

        assert!(store.clear_key().unwrap());
        assert!(!store.path().exists());
        assert_eq!(store.load_key().unwrap(), None);
    }

    #[test]
    fn clear_keeps_other_providers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"openai":{"key":"a"},"other":{"key":"b"}}"#).unwrap();

        let store = CredentialStore::at(&path);
        assert!(store.clear_key().unwrap());
        assert!(path.exists());
        assert_eq!(store.load_key().unwrap(), None);
    }

    #[test]
    fn blank_key_is_not_stored() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("auth.json"));
        assert!(store.store_key("   ").is_err());
    }

    #[test]
    fn environment_wins_over_auth_file() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("auth.json"));
        store.store_key("from-file").unwrap();

        let lookup = lookup_api_key(Some("from-env".into()), &store).unwrap();
        assert_eq!(lookup.api_key.as_deref(), Some("from-env"));
        assert_eq!(lookup.source, Some(ApiKeySource::Environment));

        let lookup = lookup_api_key(Some("  ".into()), &store).unwrap();
        assert_eq!(lookup.api_key.as_deref(), Some("from-file"));
        assert_eq!(lookup.source, Some(ApiKeySource::AuthFile));
    }

    #[test]
    fn nothing_configured_yields_empty_lookup() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("auth.json"));
        let lookup = lookup_api_key(None, &store).unwrap();
        assert!(lookup.api_key.is_none());
        assert!(lookup.source.is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();
        assert!(CredentialStore::at(&path).load_key().is_err());
    }
}
