//! Engine and narrator configuration.
//!
//! Both structs start from sensible defaults and are adjusted with `with_*`
//! builders. `from_env` layers environment overrides on top of the defaults.

use crate::session::{SessionSettings, DEFAULT_MAX_PLAYERS};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const MODEL_VAR: &str = "DUALITY_MODEL";
pub const BASE_URL_VAR: &str = "DUALITY_BASE_URL";
pub const TEMPERATURE_VAR: &str = "DUALITY_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "DUALITY_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "DUALITY_NARRATOR_TIMEOUT";
pub const MAX_PLAYERS_VAR: &str = "DUALITY_MAX_PLAYERS";
pub const SESSION_TIMEOUT_VAR: &str = "DUALITY_SESSION_TIMEOUT";

/// Seconds the game master waits for the narrator before falling back.
pub const DEFAULT_NARRATOR_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Settings for the external narrator.
#[derive(Debug, Clone, PartialEq)]
pub struct NarratorConfig {
    pub model: String,
    pub base_url: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Upper bound on a single narrator call.
    pub timeout: Duration,
    /// Replaces the built-in system prompt.
    pub custom_system_prompt: Option<String>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            model: chat::DEFAULT_MODEL.to_string(),
            base_url: chat::DEFAULT_BASE_URL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout: Duration::from_secs(DEFAULT_NARRATOR_TIMEOUT_SECS),
            custom_system_prompt: None,
        }
    }
}

impl NarratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }

    /// Defaults overridden by `DUALITY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`NarratorConfig::from_env`] but reads from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(t) = parse_var(&lookup, TEMPERATURE_VAR)? {
            config.temperature = t;
        }
        if let Some(n) = parse_var(&lookup, MAX_TOKENS_VAR)? {
            config.max_tokens = n;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_VAR)? {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_players: usize,
    pub settings: SessionSettings,
    /// Idle age after which [`crate::SessionManager::cleanup`] drops a session.
    pub session_max_age: chrono::Duration,
    pub narrator: NarratorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            settings: SessionSettings::default(),
            session_max_age: crate::manager::default_max_age(),
            narrator: NarratorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_session_max_age(mut self, max_age: chrono::Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    pub fn with_narrator(mut self, narrator: NarratorConfig) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            narrator: NarratorConfig::from_lookup(&lookup)?,
            ..Self::default()
        };
        if let Some(n) = parse_var(&lookup, MAX_PLAYERS_VAR)? {
            config.max_players = n;
        }
        if let Some(secs) = parse_var::<i64>(&lookup, SESSION_TIMEOUT_VAR)? {
            config.session_max_age = chrono::Duration::seconds(secs);
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
