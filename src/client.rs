use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use log::{debug, trace, error};
use crate::providers::{UpstreamReply, UpstreamRequest};

// ===== Wire Types =====

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse
{   #[serde(default)]
    pub data: Vec<ModelData>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelData
{   pub id: String
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope
{   error: ErrorBody
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody
{   #[serde(default)]
    message: Option<String>
}

// ===== HTTP Upstream =====

/// reqwest-backed client for an OpenAI-compatible API
pub struct HttpUpstream
{   api_key: String
  , api_base: String
  , http_client: reqwest::Client
}

impl HttpUpstream
{   pub fn new(
      config: &crate::ServerConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating HttpUpstream for {}", config.api_base);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Could not build HTTP client: {}", e);
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;
        Ok(HttpUpstream
        {   api_key: config.api_key.clone()
          , api_base: config.api_base.trim_end_matches('/').to_string()
          , http_client
        })
    }

    pub fn api_base(&self) -> &str
    {   &self.api_base
    }

    /// Turn a non-success response into `Error::ApiError`
    async fn check_status(
      response: reqwest::Response
    ) -> Result<reqwest::Response, crate::error::Error>
    {   let status = response.status();
        trace!("Upstream response status: {}", status);
        if status.is_success()
        {   return Ok(response);
        }
        let error_text = response.text().await
          .unwrap_or_else(|_| "Unknown error".to_string());
        error!("Upstream API error {}: {}", status, error_text);
        Err(crate::error::Error::ApiError
        {   status: status.as_u16()
          , message: api_error_message(&error_text)
        })
    }
}

/// Pull `error.message` out of an error body, or fall back to the body
pub fn api_error_message(body: &str) -> String
{   if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body)
    {   if let Some(message) = envelope.error.message
        {   return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty()
    {   "Unknown error".to_string()
    } else
    {   trimmed.to_string()
    }
}

fn transport_error(e: reqwest::Error) -> crate::error::Error
{   if e.is_timeout()
    {   error!("Upstream request timed out: {}", e);
        crate::error::Error::Timeout
    } else if e.is_decode()
    {   error!("Parse error: {}", e);
        crate::error::Error::ParseError(e.to_string())
    } else
    {   error!("HTTP error: {}", e);
        crate::error::Error::HttpError(e.to_string())
    }
}

#[async_trait]
impl crate::providers::Upstream for HttpUpstream
{   async fn list_models(&self)
      -> Result<Vec<String>, crate::error::Error>
    {   debug!("Fetching model list");
        let response = self.http_client
          .get(format!("{}/models", self.api_base))
          .bearer_auth(&self.api_key)
          .send()
          .await
          .map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        let models: ModelsResponse = response.json().await
          .map_err(transport_error)?;
        let ids: Vec<String> = models.data
          .into_iter()
          .map(|m| m.id)
          .collect();
        debug!("Retrieved {} models", ids.len());
        Ok(ids)
    }

    async fn generate(
      &self
    , request: &UpstreamRequest
    ) -> Result<UpstreamReply, crate::error::Error>
    {   let variant = request.variant();
        let url = format!("{}{}", self.api_base, variant.endpoint());
        debug!("POST {} with model {}", url, request.model());

        let response = self.http_client
          .post(url)
          .bearer_auth(&self.api_key)
          .json(request)
          .send()
          .await
          .map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        match variant
        {   crate::ApiVariant::Chat => response.json().await
              .map(UpstreamReply::Chat)
              .map_err(transport_error)
          , crate::ApiVariant::Responses => response.json().await
              .map(UpstreamReply::Responses)
              .map_err(transport_error)
        }
    }
}
