//! Chat Completions adapter: `messages` in, `choices` out,
//! `prompt_tokens`/`completion_tokens` usage.

use serde::{Deserialize, Serialize};
use log::trace;

/// Role used for injected instructions
const INSTRUCTION_ROLE: &str = "developer";

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChatResponse
{   #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub choices: Option<Vec<Choice>>
  , #[serde(default)]
    pub usage: Option<ChatUsage>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ChoiceMessage>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ChatUsage
{   #[serde(default)]
    pub prompt_tokens: u64
  , #[serde(default)]
    pub completion_tokens: u64
  , #[serde(default)]
    pub total_tokens: Option<u64>
}

impl From<ChatUsage> for crate::Usage
{   fn from(u: ChatUsage) -> Self
    {   crate::Usage
        {   input_tokens: u.prompt_tokens
          , output_tokens: u.completion_tokens
          , total_tokens: u.total_tokens
              .unwrap_or(u.prompt_tokens + u.completion_tokens)
        }
    }
}

// ===== Adapters =====

/// Build a Chat Completions body. Chat has no bare-string input, so a
/// single prompt becomes one user message.
pub fn to_upstream(
  request: &crate::GenerationRequest
, active_model: &str
, default_effort: crate::ReasoningEffort
) -> ChatRequest
{   let mut messages = Vec::new();
    if let Some(instructions) = &request.instructions
    {   messages.push(ChatMessage
        {   role: INSTRUCTION_ROLE.to_string()
          , content: instructions.clone()
        });
    }
    match &request.prompt
    {   crate::Prompt::Text(prompt) => {
          messages.push(ChatMessage
          {   role: "user".to_string()
            , content: prompt.clone()
          });
        }
      , crate::Prompt::Messages(turns) => {
          messages.extend(turns.iter().map(|m| ChatMessage
          {   role: role_name(m.role).to_string()
            , content: m.content.clone()
          }));
        }
    }

    let chat_request = ChatRequest
    {   model: request.effective_model(active_model).to_string()
      , messages
      , max_completion_tokens: request.max_output_tokens
      , temperature: request.temperature
      , top_p: request.top_p
      , reasoning_effort: request
          .effective_effort(default_effort)
          .upstream_value()
          .map(str::to_string)
    };
    trace!("Chat request: {:?}", chat_request);
    chat_request
}

/// Normalize a Chat Completions body: first choice's content, or empty.
pub fn from_upstream(
  raw: &ChatResponse
, echo: &crate::request::RequestEcho
) -> crate::NormalizedResult
{   let text = raw.choices
      .as_deref()
      .and_then(|choices| choices.first())
      .and_then(|c| c.message.as_ref())
      .and_then(|m| m.content.clone())
      .unwrap_or_default();

    crate::NormalizedResult
    {   text
      , model_used: super::model_used(raw.model.as_deref(), echo)
      , usage: raw.usage.map(crate::Usage::from)
      , truncated: false
      , message_count: echo.message_count
    }
}

pub(crate) fn role_name(role: crate::Role) -> &'static str
{   match role
    {   crate::Role::User => "user"
      , crate::Role::Assistant => "assistant"
      , crate::Role::Developer => "developer"
    }
}
