//! Configuration management for matchday
//!
//! Stores settings in ~/.config/matchday/config.json. Environment variables
//! override the file; command-line flags override both. The provider API key
//! is never written to disk: the function reads it from its own environment
//! on every request.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8888/.netlify/functions/analyze";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8888";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LANGUAGE: &str = "Portuguese (Portugal)";
/// Client-side pause after every request before another is accepted.
pub const DEFAULT_COOLDOWN_SECS: u64 = 25;
pub const DEFAULT_MAX_TOKENS: u32 = 900;

/// How the function asks the model for JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// Prompt instructions plus plain JSON mode.
    #[default]
    Json,
    /// Strict provider-enforced JSON schema.
    Schema,
}

impl std::str::FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(PromptVariant::Json),
            "schema" => Ok(PromptVariant::Schema),
            other => Err(format!(
                "Unknown prompt variant '{}' (expected 'json' or 'schema')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the analyze function the client posts to.
    pub endpoint: String,
    pub cooldown_secs: u64,
    /// Address `matchday serve` listens on.
    pub bind_addr: String,
    /// OpenAI-compatible API base URL.
    pub api_base: String,
    pub model: String,
    pub prompt_variant: PromptVariant,
    /// Language the model is asked to answer in.
    pub language: String,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt_variant: PromptVariant::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn non_blank_or(value: &mut String, fallback: &str) {
    if value.trim().is_empty() {
        *value = fallback.to_string();
    } else {
        *value = value.trim().to_string();
    }
}

impl Config {
    fn sanitize(&mut self) {
        non_blank_or(&mut self.endpoint, DEFAULT_ENDPOINT);
        non_blank_or(&mut self.bind_addr, DEFAULT_BIND_ADDR);
        non_blank_or(&mut self.api_base, DEFAULT_API_BASE);
        non_blank_or(&mut self.model, DEFAULT_MODEL);
        non_blank_or(&mut self.language, DEFAULT_LANGUAGE);
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        if self.max_tokens == 0 {
            self.max_tokens = DEFAULT_MAX_TOKENS;
        }
    }

    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("matchday"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk with environment overrides, or defaults.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load config from a specific file, or return default.
    ///
    /// A file that fails to parse is moved aside to `config.json.corrupt`.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<Config>(&content) {
                Ok(mut config) => {
                    config.sanitize();
                    return config;
                }
                Err(err) => {
                    preserve_corrupt_config(path, &content);
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "config file was corrupted; a backup was saved and defaults were loaded"
                    );
                }
            }
        }
        Self::default()
    }

    /// Apply `MATCHDAY_*` / `OPENAI_BASE_URL` overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("MATCHDAY_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(raw) = lookup("MATCHDAY_COOLDOWN_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.cooldown_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring non-numeric MATCHDAY_COOLDOWN_SECS"),
            }
        }
        if let Some(bind) = lookup("MATCHDAY_BIND") {
            self.bind_addr = bind;
        }
        if let Some(model) = lookup("MATCHDAY_MODEL") {
            self.model = model;
        }
        if let Some(api_base) = lookup("OPENAI_BASE_URL") {
            self.api_base = api_base;
        }
        if let Some(raw) = lookup("MATCHDAY_PROMPT_VARIANT") {
            match raw.parse::<PromptVariant>() {
                Ok(variant) => self.prompt_variant = variant,
                Err(err) => warn!("{}", err),
            }
        }
        if let Some(language) = lookup("MATCHDAY_LANGUAGE") {
            self.language = language;
        }
        self.sanitize();
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Save config to disk
    pub fn save(&self) -> Result<(), String> {
        let dir =
            Self::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;

        fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)) {
                warn!(error = %e, "failed to set config directory permissions");
            }
        }

        self.save_to(&dir.join("config.json"))
    }

    /// Save config to a specific file, replacing it atomically.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let mut sanitized = self.clone();
        sanitized.sanitize();
        let content = serde_json::to_string_pretty(&sanitized)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        write_config_atomic(path, &content).map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Provider API key from the process environment, if set and non-blank.
    pub fn api_key() -> Option<String> {
        Self::api_key_from(|key| std::env::var(key).ok())
    }

    pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/matchday/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

fn write_config_atomic(path: &Path, content: &str) -> Result<(), String> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path).map_err(|e| e.to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
            warn!(error = %e, "failed to set temp config file permissions");
        }
    }

    file.write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cooldown_secs, 25);
        assert_eq!(config.cooldown(), Duration::from_secs(25));
        assert_eq!(config.prompt_variant, PromptVariant::Json);
        assert!(config.endpoint.ends_with("/.netlify/functions/analyze"));
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"cooldown_secs": 5}"#).unwrap();
        assert_eq!(parsed.cooldown_secs, 5);
        assert_eq!(parsed.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            model: "gpt-4.1-mini".to_string(),
            prompt_variant: PromptVariant::Schema,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_config_is_preserved_and_defaults_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Config::load_from(&dir.path().join("absent.json")),
            Config::default()
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("MATCHDAY_ENDPOINT", "https://example.netlify.app/.netlify/functions/analyze"),
            ("MATCHDAY_COOLDOWN_SECS", "3"),
            ("MATCHDAY_PROMPT_VARIANT", "Schema"),
            ("OPENAI_BASE_URL", "http://localhost:4000/v1/"),
        ]));
        assert_eq!(
            config.endpoint,
            "https://example.netlify.app/.netlify/functions/analyze"
        );
        assert_eq!(config.cooldown_secs, 3);
        assert_eq!(config.prompt_variant, PromptVariant::Schema);
        assert_eq!(config.api_base, "http://localhost:4000/v1");
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("MATCHDAY_COOLDOWN_SECS", "soon"),
            ("MATCHDAY_PROMPT_VARIANT", "yaml"),
            ("MATCHDAY_MODEL", "   "),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_api_key_requires_non_blank_value() {
        assert_eq!(Config::api_key_from(env(&[])), None);
        assert_eq!(Config::api_key_from(env(&[(API_KEY_ENV, "  ")])), None);
        assert_eq!(
            Config::api_key_from(env(&[(API_KEY_ENV, "sk-test ")])),
            Some("sk-test".to_string())
        );
    }
}
