//! Unified request and response types for llm-delegate

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::trace;

/// What the caller wants the model to respond to
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt
{   /// A single prompt string (generate)
    Text(String)
  , /// An ordered conversation (converse)
    Messages(Vec<crate::Message>)
}

/// Validated, provider-neutral generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest
{   /// Prompt text or conversation
    pub prompt: Prompt
  , /// Model override for this call
    pub model: Option<String>
  , /// System/developer instructions
    pub instructions: Option<String>
  , /// Reasoning effort override for this call
    pub reasoning_effort: Option<crate::ReasoningEffort>
  , /// Upper bound on generated tokens
    pub max_output_tokens: Option<u32>
  , /// Sampling temperature
    pub temperature: Option<f64>
  , /// Nucleus sampling mass
    pub top_p: Option<f64>
  , /// How the result is rendered
    pub response_format: crate::OutputFormat
}

impl GenerationRequest
{   /// Shorthand for a single prompt with every option unset
    pub fn text(prompt: impl Into<String>) -> Self
    {   GenerationRequest
        {   prompt: Prompt::Text(prompt.into())
          , model: None
          , instructions: None
          , reasoning_effort: None
          , max_output_tokens: None
          , temperature: None
          , top_p: None
          , response_format: crate::OutputFormat::Markdown
        }
    }

    /// Shorthand for a conversation with every option unset
    pub fn messages(messages: Vec<crate::Message>) -> Self
    {   GenerationRequest
        {   prompt: Prompt::Messages(messages)
          , ..GenerationRequest::text(String::new())
        }
    }

    /// Number of caller-supplied turns, for multi-turn requests only
    pub fn message_count(&self) -> Option<usize>
    {   match &self.prompt
        {   Prompt::Text(_) => None
          , Prompt::Messages(messages) => Some(messages.len())
        }
    }

    /// Model this request runs against
    pub fn effective_model<'a>(&'a self, active_model: &'a str) -> &'a str
    {   self.model.as_deref().unwrap_or(active_model)
    }

    /// Reasoning effort this request runs with
    pub fn effective_effort(
      &self
    , default_effort: crate::ReasoningEffort
    ) -> crate::ReasoningEffort
    {   self.reasoning_effort.unwrap_or(default_effort)
    }

    /// What the normalizer needs to know about the request
    pub fn echo(&self, active_model: &str) -> RequestEcho
    {   RequestEcho
        {   model: self.effective_model(active_model).to_string()
          , message_count: self.message_count()
        }
    }
}

/// Request facts carried over to response normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEcho
{   pub model: String
  , pub message_count: Option<usize>
}

/// The one result shape every upstream variant is normalized into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult
{   /// Generated text
    pub text: String
  , /// Model that produced it
    #[serde(rename = "model")]
    pub model_used: String
  , /// Tokens used; absent when the upstream did not report any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<crate::Usage>
  , /// Whether the rendered output was cut to the character limit
    pub truncated: bool
  , /// Caller-supplied turn count for multi-turn calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>
}

// ===== Tool parameters =====

/// Arguments of the `generate` tool
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateParams
{   pub input: String
  , #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub instructions: Option<String>
  , #[serde(default)]
    pub reasoning_effort: Option<crate::ReasoningEffort>
  , #[serde(default)]
    pub max_output_tokens: Option<u32>
  , #[serde(default)]
    pub temperature: Option<f64>
  , #[serde(default)]
    pub top_p: Option<f64>
  , #[serde(default)]
    pub response_format: Option<crate::OutputFormat>
}

/// Arguments of the `converse` tool
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverseParams
{   pub messages: Vec<crate::Message>
  , #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub instructions: Option<String>
  , #[serde(default)]
    pub reasoning_effort: Option<crate::ReasoningEffort>
  , #[serde(default)]
    pub max_output_tokens: Option<u32>
  , #[serde(default)]
    pub temperature: Option<f64>
  , #[serde(default)]
    pub top_p: Option<f64>
  , #[serde(default)]
    pub response_format: Option<crate::OutputFormat>
}

/// Arguments of the `status` tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusParams {}

/// Decode tool arguments, treating missing arguments as `{}`
pub fn parse_arguments<T: DeserializeOwned>(
  tool: &str
, arguments: Value
) -> Result<T, crate::error::Error>
{   let arguments = match arguments
    {   Value::Null => Value::Object(Default::default())
      , other => other
    };
    trace!("{} arguments: {}", tool, arguments);
    serde_json::from_value(arguments).map_err(|e| {
      crate::error::Error::Validation(format!("{}: {}", tool, e))
    })
}

impl GenerateParams
{   pub fn into_request(
      self
    , variant: crate::ApiVariant
    ) -> Result<GenerationRequest, crate::error::Error>
    {   if self.input.is_empty()
        {   return Err(crate::error::Error::Validation(
              "input must not be empty".to_string()
            ));
        }
        let request = GenerationRequest
        {   prompt: Prompt::Text(self.input)
          , model: self.model
          , instructions: self.instructions
          , reasoning_effort: self.reasoning_effort
          , max_output_tokens: self.max_output_tokens
          , temperature: self.temperature
          , top_p: self.top_p
          , response_format: self.response_format.unwrap_or_default()
        };
        check_options(&request, variant)?;
        Ok(request)
    }
}

impl ConverseParams
{   pub fn into_request(
      self
    , variant: crate::ApiVariant
    ) -> Result<GenerationRequest, crate::error::Error>
    {   if self.messages.is_empty()
        {   return Err(crate::error::Error::Validation(
              "messages must contain at least one entry".to_string()
            ));
        }
        if let Some(index) = self.messages
          .iter()
          .position(|m| m.content.is_empty())
        {   return Err(crate::error::Error::Validation(format!(
              "messages[{}].content must not be empty", index
            )));
        }
        let request = GenerationRequest
        {   prompt: Prompt::Messages(self.messages)
          , model: self.model
          , instructions: self.instructions
          , reasoning_effort: self.reasoning_effort
          , max_output_tokens: self.max_output_tokens
          , temperature: self.temperature
          , top_p: self.top_p
          , response_format: self.response_format.unwrap_or_default()
        };
        check_options(&request, variant)?;
        Ok(request)
    }
}

/// Range checks shared by both generation tools
fn check_options(
  request: &GenerationRequest
, variant: crate::ApiVariant
) -> Result<(), crate::error::Error>
{   use crate::error::Error;

    if let Some(model) = &request.model
    {   if model.is_empty()
        {   return Err(Error::Validation(
              "model must not be empty".to_string()
            ));
        }
    }
    if let Some(effort) = request.reasoning_effort
    {   if !variant.supports_effort(effort)
        {   return Err(Error::Validation(format!(
              "reasoning_effort '{}' is not supported by the {} API",
              effort.as_str(),
              variant.as_str()
            )));
        }
    }
    if request.max_output_tokens == Some(0)
    {   return Err(Error::Validation(
          "max_output_tokens must be at least 1".to_string()
        ));
    }
    if let Some(t) = request.temperature
    {   if !(0.0..=2.0).contains(&t)
        {   return Err(Error::Validation(format!(
              "temperature must be between 0 and 2, got {}", t
            )));
        }
    }
    if let Some(p) = request.top_p
    {   if !(0.0..=1.0).contains(&p)
        {   return Err(Error::Validation(format!(
              "top_p must be between 0 and 1, got {}", p
            )));
        }
    }
    Ok(())
}
