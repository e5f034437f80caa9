//! Responses adapter: `input` in, `output` items out,
//! `input_tokens`/`output_tokens` usage.

use serde::{Deserialize, Serialize};
use log::trace;

/// Content part type that carries generated text
const OUTPUT_TEXT: &str = "output_text";

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage
{   pub role: String
  , pub content: String
}

/// `input` is either the bare prompt or a list of turns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsesInput
{   Text(String)
  , Messages(Vec<InputMessage>)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig
{   pub effort: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsesRequest
{   pub model: String
  , pub input: ResponsesInput
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponsesResponse
{   #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub output: Option<Vec<OutputItem>>
  , #[serde(default)]
    pub usage: Option<ResponsesUsage>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OutputItem
{   #[serde(default)]
    pub content: Option<Vec<ContentPart>>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ContentPart
{   #[serde(default, rename = "type")]
    pub kind: String
  , #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ResponsesUsage
{   #[serde(default)]
    pub input_tokens: u64
  , #[serde(default)]
    pub output_tokens: u64
  , #[serde(default)]
    pub total_tokens: Option<u64>
}

impl From<ResponsesUsage> for crate::Usage
{   fn from(u: ResponsesUsage) -> Self
    {   crate::Usage
        {   input_tokens: u.input_tokens
          , output_tokens: u.output_tokens
          , total_tokens: u.total_tokens
              .unwrap_or(u.input_tokens + u.output_tokens)
        }
    }
}

// ===== Adapters =====

/// Build a Responses body. A single prompt keeps its instructions in
/// the top-level `instructions` field; a conversation gets them as a
/// leading developer turn.
pub fn to_upstream(
  request: &crate::GenerationRequest
, active_model: &str
, default_effort: crate::ReasoningEffort
) -> ResponsesRequest
{   let (input, instructions) = match &request.prompt
    {   crate::Prompt::Text(prompt) => (
          ResponsesInput::Text(prompt.clone())
        , request.instructions.clone()
        )
      , crate::Prompt::Messages(turns) => {
          let mut messages = Vec::with_capacity(turns.len() + 1);
          if let Some(instructions) = &request.instructions
          {   messages.push(InputMessage
              {   role: "developer".to_string()
                , content: instructions.clone()
              });
          }
          messages.extend(turns.iter().map(|m| InputMessage
          {   role: super::chat::role_name(m.role).to_string()
            , content: m.content.clone()
          }));
          (ResponsesInput::Messages(messages), None)
        }
    };

    let responses_request = ResponsesRequest
    {   model: request.effective_model(active_model).to_string()
      , input
      , instructions
      , max_output_tokens: request.max_output_tokens
      , temperature: request.temperature
      , top_p: request.top_p
      , reasoning: request
          .effective_effort(default_effort)
          .upstream_value()
          .map(|effort| ReasoningConfig
          {   effort: effort.to_string()
          })
    };
    trace!("Responses request: {:?}", responses_request);
    responses_request
}

/// Normalize a Responses body. Text parts within an item are joined
/// directly; items are separated by a blank line. Items without any
/// output text (reasoning summaries, tool calls) are skipped, and a
/// `null` list counts as empty.
pub fn from_upstream(
  raw: &ResponsesResponse
, echo: &crate::request::RequestEcho
) -> crate::NormalizedResult
{   let text = raw.output
      .iter()
      .flatten()
      .map(|item| {
        item.content
          .iter()
          .flatten()
          .filter(|part| part.kind == OUTPUT_TEXT)
          .filter_map(|part| part.text.as_deref())
          .collect::<String>()
      })
      .filter(|item_text| !item_text.is_empty())
      .collect::<Vec<_>>()
      .join("\n\n");

    crate::NormalizedResult
    {   text
      , model_used: super::model_used(raw.model.as_deref(), echo)
      , usage: raw.usage.map(crate::Usage::from)
      , truncated: false
      , message_count: echo.message_count
    }
}
