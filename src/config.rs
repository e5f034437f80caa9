//! Configuration for the server, read once from the environment

use serde::{Deserialize, Serialize};
use log::debug;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const API_TYPE_VAR: &str = "OPENAI_API_TYPE";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const DEFAULT_REASONING_VAR: &str = "OPENAI_DEFAULT_REASONING";
pub const TIMEOUT_VAR: &str = "OPENAI_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Upstream endpoint family the server speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant
{   /// `POST /responses`: `input`/`output` items, `input_tokens` usage
    #[default]
    Responses
  , /// `POST /chat/completions`: `messages`/`choices`, `prompt_tokens` usage
    Chat
}

impl ApiVariant
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   ApiVariant::Responses => "responses"
          , ApiVariant::Chat => "chat"
        }
    }

    pub fn parse(value: &str) -> Option<Self>
    {   match value.trim().to_ascii_lowercase().as_str()
        {   "responses" => Some(ApiVariant::Responses)
          , "chat" | "chat_completions" => Some(ApiVariant::Chat)
          , _ => None
        }
    }

    /// Path appended to the API base for generation calls.
    pub fn endpoint(&self) -> &'static str
    {   match self
        {   ApiVariant::Responses => "/responses"
          , ApiVariant::Chat => "/chat/completions"
        }
    }

    /// Reasoning-effort values this endpoint family accepts. Chat
    /// Completions has no `minimal` level.
    pub fn reasoning_efforts(&self) -> &'static [crate::ReasoningEffort]
    {   use crate::ReasoningEffort as Effort;
        match self
        {   ApiVariant::Responses => &[
              Effort::None, Effort::Minimal, Effort::Low,
              Effort::Medium, Effort::High
            ]
          , ApiVariant::Chat => &[
              Effort::None, Effort::Low, Effort::Medium, Effort::High
            ]
        }
    }

    pub fn supports_effort(&self, effort: crate::ReasoningEffort) -> bool
    {   self.reasoning_efforts().contains(&effort)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   /// Upstream credential
    pub api_key: String
  , /// Model override requested through the environment
    pub configured_model: Option<String>
  , /// Model used when the override is absent or unknown
    pub fallback_model: String
  , /// Which upstream endpoint family to call
    pub api_variant: ApiVariant
  , /// API base URL
    pub api_base: String
  , /// Effort applied when a call does not choose one
    pub default_reasoning: crate::ReasoningEffort
  , /// Maximum characters per tool result
    pub character_limit: usize
  , /// Request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   api_key: String::new()
          , configured_model: None
          , fallback_model: crate::FALLBACK_MODEL.to_string()
          , api_variant: ApiVariant::default()
          , api_base: DEFAULT_API_BASE.to_string()
          , default_reasoning: crate::ReasoningEffort::Low
          , character_limit: crate::CHARACTER_LIMIT
          , timeout_secs: None
        }
    }
}

impl ServerConfig
{   /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR)
          .ok_or_else(|| {
            crate::error::Error::MissingApiKey(
              API_KEY_VAR.to_string()
            )
          })?;

        let mut config = ServerConfig
        {   api_key
          , configured_model: get(MODEL_VAR)
          , ..ServerConfig::default()
        };

        if let Some(raw) = get(API_TYPE_VAR)
        {   config.api_variant = ApiVariant::parse(&raw)
              .ok_or_else(|| {
                crate::error::Error::InvalidConfiguration(format!(
                  "{} must be 'responses' or 'chat', got '{}'",
                  API_TYPE_VAR, raw
                ))
              })?;
        }

        if let Some(raw) = get(BASE_URL_VAR)
        {   config.api_base = raw.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(DEFAULT_REASONING_VAR)
        {   config.default_reasoning
              = crate::ReasoningEffort::parse(&raw)
                .ok_or_else(|| {
                  crate::error::Error::InvalidConfiguration(format!(
                    "{} has unknown reasoning effort '{}'",
                    DEFAULT_REASONING_VAR, raw
                  ))
                })?;
        }
        if !config.api_variant.supports_effort(config.default_reasoning)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "{} '{}' is not accepted by the {} API",
                DEFAULT_REASONING_VAR,
                config.default_reasoning.as_str(),
                config.api_variant.as_str()
              )
            ));
        }

        if let Some(raw) = get(TIMEOUT_VAR)
        {   let secs = raw.parse::<u64>()
              .ok()
              .filter(|secs| *secs > 0)
              .ok_or_else(|| {
                crate::error::Error::InvalidConfiguration(format!(
                  "{} must be a positive integer, got '{}'",
                  TIMEOUT_VAR, raw
                ))
              })?;
            config.timeout_secs = Some(secs);
        }

        debug!(
          "Loaded config: api={} base={} model={:?}",
          config.api_variant.as_str(),
          config.api_base,
          config.configured_model
        );
        Ok(config)
    }

    pub fn api_key_configured(&self) -> bool
    {   !self.api_key.is_empty()
    }
}
