pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod fallback;
pub mod client;
pub mod format;
pub mod tools;
pub mod server;
use serde::{Deserialize, Serialize};

/*

llm-delegate: an async MCP server that hands text generation off to an
upstream LLM API. Callers see three tools (generate, converse, status);
every upstream endpoint family is translated into one request shape on
the way in and one result shape on the way out.

llm-delegate/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Shared value types and re-exports
│   ├── main.rs         # Binary: env config, model check, stdio loop
│   ├── error.rs        # Error type and upstream error classification
│   ├── config.rs       # Server configuration from the environment
│   ├── client.rs       # reqwest client for the upstream API
│   ├── providers/      # One adapter pair per upstream endpoint family
│   │   ├── mod.rs      # Upstream trait, tagged request/reply enums
│   │   ├── chat.rs     # Chat Completions
│   │   └── responses.rs # Responses
│   ├── request.rs      # Tool parameters, GenerationRequest, results
│   ├── fallback.rs     # Startup model validation with fallback
│   ├── format.rs       # Markdown/JSON rendering and truncation
│   ├── tools.rs        # Tool catalogue and dispatch
│   └── server.rs       # JSON-RPC over stdio
└── tests/

*/

/// Name reported in the MCP `initialize` handshake.
pub const SERVER_NAME: &str = "llm-delegate";

/// Crate version, reported by `initialize` and the status tool.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of characters a tool result may carry.
pub const CHARACTER_LIMIT: usize = 25_000;

/// Model used when no override is configured or the override is unknown.
pub const FALLBACK_MODEL: &str = "gpt-5";

/// Provider-side knob trading latency for deliberation depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort
{   None
  , Minimal
  , Low
  , Medium
  , High
}

impl ReasoningEffort
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   ReasoningEffort::None => "none"
          , ReasoningEffort::Minimal => "minimal"
          , ReasoningEffort::Low => "low"
          , ReasoningEffort::Medium => "medium"
          , ReasoningEffort::High => "high"
        }
    }

    pub fn parse(value: &str) -> Option<Self>
    {   match value.trim().to_ascii_lowercase().as_str()
        {   "none" => Some(ReasoningEffort::None)
          , "minimal" => Some(ReasoningEffort::Minimal)
          , "low" => Some(ReasoningEffort::Low)
          , "medium" => Some(ReasoningEffort::Medium)
          , "high" => Some(ReasoningEffort::High)
          , _ => None
        }
    }

    /// Value to put on the wire. `None` means the reasoning field is
    /// left out of the upstream request entirely.
    pub fn upstream_value(&self) -> Option<&'static str>
    {   match self
        {   ReasoningEffort::None => None
          , other => Some(other.as_str())
        }
    }
}

/// How a generation result is rendered for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat
{   #[default]
    Markdown
  , Json
}

impl OutputFormat
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   OutputFormat::Markdown => "markdown"
          , OutputFormat::Json => "json"
        }
    }
}

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   User
  , Assistant
  , Developer
}

/// One caller-supplied conversation turn.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Message
{   pub role: Role
  , pub content: String
}

/// Token accounting, whichever naming convention the upstream used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Usage
{   pub input_tokens: u64
  , pub output_tokens: u64
  , pub total_tokens: u64
}

pub use config::{ApiVariant, ServerConfig};
pub use error::{classify, ClassifiedError, Error, ErrorKind};
pub use fallback::{resolve_active_model, ActiveModelState};
pub use request::{GenerationRequest, NormalizedResult, Prompt};
pub use tools::{ServerState, ToolResult};
