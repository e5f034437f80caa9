//! Upstream endpoint families and the seam used to reach them
//!
//! Each family gets a `to_upstream`/`from_upstream` pair. Callers go
//! through [`build_request`] and [`normalize`], which pick the pair from
//! the configured [`crate::ApiVariant`].

use async_trait::async_trait;
use serde::Serialize;

pub mod chat;
pub mod responses;

pub use chat::{ChatRequest, ChatResponse};
pub use responses::{ResponsesRequest, ResponsesResponse};

/// A request body for one endpoint family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpstreamRequest
{   Chat(ChatRequest)
  , Responses(ResponsesRequest)
}

impl UpstreamRequest
{   pub fn variant(&self) -> crate::ApiVariant
    {   match self
        {   UpstreamRequest::Chat(_) => crate::ApiVariant::Chat
          , UpstreamRequest::Responses(_) => crate::ApiVariant::Responses
        }
    }

    pub fn model(&self) -> &str
    {   match self
        {   UpstreamRequest::Chat(r) => &r.model
          , UpstreamRequest::Responses(r) => &r.model
        }
    }
}

/// A decoded response body from one endpoint family
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply
{   Chat(ChatResponse)
  , Responses(ResponsesResponse)
}

/// Anything that can list models and run a generation request.
/// [`crate::client::HttpUpstream`] is the real implementation.
#[async_trait]
pub trait Upstream: Send + Sync
{   /// Identifiers of every model the credential can use
    async fn list_models(&self)
      -> Result<Vec<String>, crate::error::Error>;

    /// Send one generation request
    async fn generate(
      &self
    , request: &UpstreamRequest
    ) -> Result<UpstreamReply, crate::error::Error>;
}

/// Translate a validated request into the configured family's body
pub fn build_request(
  variant: crate::ApiVariant
, request: &crate::GenerationRequest
, active_model: &str
, default_effort: crate::ReasoningEffort
) -> UpstreamRequest
{   match variant
    {   crate::ApiVariant::Chat => UpstreamRequest::Chat(
          chat::to_upstream(request, active_model, default_effort)
        )
      , crate::ApiVariant::Responses => UpstreamRequest::Responses(
          responses::to_upstream(request, active_model, default_effort)
        )
    }
}

/// Fold any family's reply into a [`crate::NormalizedResult`]
pub fn normalize(
  reply: &UpstreamReply
, echo: &crate::request::RequestEcho
) -> crate::NormalizedResult
{   match reply
    {   UpstreamReply::Chat(raw) => chat::from_upstream(raw, echo)
      , UpstreamReply::Responses(raw) => responses::from_upstream(raw, echo)
    }
}

/// Echoed model when the upstream reported a non-empty one
pub(crate) fn model_used(
  echoed: Option<&str>
, echo: &crate::request::RequestEcho
) -> String
{   echoed
      .filter(|m| !m.is_empty())
      .unwrap_or(&echo.model)
      .to_string()
}
