//! Tool catalogue and per-call dispatch

use std::sync::Arc;
use serde::Serialize;
use serde_json::{json, Value};
use log::{debug, info};

use crate::providers::{build_request, normalize, Upstream};
use crate::request::{
  parse_arguments, ConverseParams, GenerateParams, StatusParams
};

pub const GENERATE_TOOL: &str = "generate";
pub const CONVERSE_TOOL: &str = "converse";
pub const STATUS_TOOL: &str = "status";

/// Everything a tool call may read. Built once at startup and shared
/// read-only between calls.
pub struct ServerState
{   pub config: crate::ServerConfig
  , pub model: crate::ActiveModelState
  , pub upstream: Arc<dyn Upstream>
}

impl ServerState
{   pub fn new(
      config: crate::ServerConfig
    , model: crate::ActiveModelState
    , upstream: Arc<dyn Upstream>
    ) -> Self
    {   ServerState
        {   config
          , model
          , upstream
        }
    }
}

/// Outcome of one tool call, in MCP `CallToolResult` terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult
{   pub text: String
  , pub structured: Option<Value>
  , pub is_error: bool
}

impl ToolResult
{   pub fn success(text: String, structured: Option<Value>) -> Self
    {   ToolResult
        {   text
          , structured
          , is_error: false
        }
    }

    /// Classify a failure into an error result
    pub fn failure(error: &crate::error::Error) -> Self
    {   let classified = crate::error::classify(error);
        info!("Tool call failed ({:?}): {}", classified.kind, error);
        ToolResult
        {   text: classified.message
          , structured: None
          , is_error: true
        }
    }

    pub fn to_value(&self) -> Value
    {   let mut value = json!({
          "content": [
            {
              "type": "text",
              "text": self.text
            }
          ],
          "isError": self.is_error
        });
        if let Some(structured) = &self.structured
        {   value["structuredContent"] = structured.clone();
        }
        value
    }
}

/// Tool definitions for `tools/list`. The reasoning-effort enum follows
/// what the configured API accepts.
pub fn tool_list(variant: crate::ApiVariant) -> Value
{   let efforts: Vec<&str> = variant
      .reasoning_efforts()
      .iter()
      .map(|e| e.as_str())
      .collect();
    let options = json!({
      "model": {
        "type": "string",
        "minLength": 1,
        "description": "Model override. Defaults to the active model (see status)."
      },
      "instructions": {
        "type": "string",
        "description": "System/developer instructions for the model."
      },
      "reasoning_effort": {
        "type": "string",
        "enum": efforts,
        "description": "Reasoning effort. 'none' disables reasoning configuration."
      },
      "max_output_tokens": {
        "type": "integer",
        "minimum": 1,
        "description": "Upper bound on generated tokens."
      },
      "temperature": {
        "type": "number",
        "minimum": 0,
        "maximum": 2
      },
      "top_p": {
        "type": "number",
        "minimum": 0,
        "maximum": 1
      },
      "response_format": {
        "type": "string",
        "enum": ["markdown", "json"],
        "default": "markdown"
      }
    });

    let mut generate_props = options.clone();
    generate_props["input"] = json!({
      "type": "string",
      "minLength": 1,
      "description": "Prompt to send to the model."
    });

    let mut converse_props = options;
    converse_props["messages"] = json!({
      "type": "array",
      "minItems": 1,
      "description": "Conversation so far, oldest first.",
      "items": {
        "type": "object",
        "properties": {
          "role": {
            "type": "string",
            "enum": ["user", "assistant", "developer"]
          },
          "content": {
            "type": "string",
            "minLength": 1
          }
        },
        "required": ["role", "content"],
        "additionalProperties": false
      }
    });

    json!([
      {
        "name": GENERATE_TOOL,
        "title": "Generate",
        "description": "Generate text from a single prompt with the upstream model.",
        "inputSchema": {
          "type": "object",
          "properties": generate_props,
          "required": ["input"],
          "additionalProperties": false
        },
        "annotations": {
          "readOnlyHint": true,
          "idempotentHint": false,
          "openWorldHint": true
        }
      },
      {
        "name": CONVERSE_TOOL,
        "title": "Converse",
        "description": "Continue a multi-turn conversation with the upstream model.",
        "inputSchema": {
          "type": "object",
          "properties": converse_props,
          "required": ["messages"],
          "additionalProperties": false
        },
        "annotations": {
          "readOnlyHint": true,
          "idempotentHint": false,
          "openWorldHint": true
        }
      },
      {
        "name": STATUS_TOOL,
        "title": "Status",
        "description": "Report the active model and server configuration.",
        "inputSchema": {
          "type": "object",
          "properties": {},
          "additionalProperties": false
        },
        "annotations": {
          "readOnlyHint": true,
          "idempotentHint": true,
          "openWorldHint": false
        }
      }
    ])
}

/// Dispatch one `tools/call`. `Err` means the arguments were rejected
/// before anything was sent upstream; upstream failures come back as
/// `Ok` results with `is_error` set.
pub async fn call_tool(
  state: &ServerState
, name: &str
, arguments: Value
) -> Result<ToolResult, crate::error::Error>
{   let variant = state.config.api_variant;
    match name
    {   GENERATE_TOOL => {
          let request = parse_arguments::<GenerateParams>(name, arguments)?
            .into_request(variant)?;
          Ok(run_generation(state, &request).await)
        }
      , CONVERSE_TOOL => {
          let request = parse_arguments::<ConverseParams>(name, arguments)?
            .into_request(variant)?;
          Ok(run_generation(state, &request).await)
        }
      , STATUS_TOOL => {
          let _: StatusParams = parse_arguments(name, arguments)?;
          let report = status_report(state);
          let text = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|_| report.to_string());
          Ok(ToolResult::success(text, Some(report)))
        }
      , other => Err(crate::error::Error::Validation(format!(
          "Unknown tool '{}'", other
        )))
    }
}

/// Send a request upstream and normalize the reply
pub async fn generate_result(
  state: &ServerState
, request: &crate::GenerationRequest
) -> Result<crate::NormalizedResult, crate::error::Error>
{   let active = &state.model.active_id;
    let upstream_request = build_request(
      state.config.api_variant,
      request,
      active,
      state.config.default_reasoning
    );
    debug!("Generating with model {}", upstream_request.model());
    let reply = state.upstream.generate(&upstream_request).await?;
    Ok(normalize(&reply, &request.echo(active)))
}

/// Full generation pipeline: upstream call, rendering, truncation
pub async fn run_generation(
  state: &ServerState
, request: &crate::GenerationRequest
) -> ToolResult
{   let mut result = match generate_result(state, request).await
    {   Ok(result) => result
      , Err(e) => return ToolResult::failure(&e)
    };
    let rendered = crate::format::render(&result, request.response_format);
    let (text, truncated) = crate::format::truncate(
      &rendered,
      state.config.character_limit
    );
    result.truncated = truncated;

    let mut echo = json!({
      "model": result.model_used,
      "truncated": result.truncated,
      "response_format": request.response_format.as_str(),
    });
    if let Some(usage) = &result.usage
    {   echo["usage"] = json!(usage);
    }
    if let Some(count) = result.message_count
    {   echo["message_count"] = json!(count);
    }
    ToolResult::success(text, Some(echo))
}

/// Snapshot of the server's model and configuration
pub fn status_report(state: &ServerState) -> Value
{   json!({
      "active_model": state.model.active_id,
      "configured_model": state.model.configured_id,
      "fallback_model": state.model.fallback_id,
      "fallback_used": state.model.fallback_used,
      "default_reasoning": state.config.default_reasoning.as_str(),
      "character_limit": state.config.character_limit,
      "server_version": crate::SERVER_VERSION,
      "api_key_configured": state.config.api_key_configured(),
      "api_type": state.config.api_variant.as_str(),
    })
}
