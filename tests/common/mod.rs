#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use serde_json::Value;

use llm_delegate::providers::{
  ChatResponse, ResponsesResponse, Upstream, UpstreamReply, UpstreamRequest
};
use llm_delegate::{ActiveModelState, Error, ServerConfig, ServerState};

/// Scripted upstream that records what it was sent
pub struct FakeUpstream
{   pub models: Result<Vec<String>, Error>
  , pub reply: Result<UpstreamReply, Error>
  , pub panic_on_generate: bool
  , pub requests: Mutex<Vec<UpstreamRequest>>
  , pub list_calls: AtomicUsize
}

impl FakeUpstream
{   pub fn replying(reply: UpstreamReply) -> Self
    {   FakeUpstream
        {   models: Ok(vec![])
          , reply: Ok(reply)
          , panic_on_generate: false
          , requests: Mutex::new(vec![])
          , list_calls: AtomicUsize::new(0)
        }
    }

    pub fn failing(error: Error) -> Self
    {   FakeUpstream
        {   reply: Err(error)
          , ..FakeUpstream::replying(responses_reply(Value::Null))
        }
    }

    pub fn with_models(mut self, models: Result<Vec<String>, Error>) -> Self
    {   self.models = models;
        self
    }

    pub fn list_call_count(&self) -> usize
    {   self.list_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<UpstreamRequest>
    {   self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for FakeUpstream
{   async fn list_models(&self) -> Result<Vec<String>, Error>
    {   self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.models.clone()
    }

    async fn generate(
      &self
    , request: &UpstreamRequest
    ) -> Result<UpstreamReply, Error>
    {   if self.panic_on_generate
        {   panic!("upstream exploded");
        }
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

/// A Responses reply from JSON; `null` gives an empty body
pub fn responses_reply(body: Value) -> UpstreamReply
{   let raw: ResponsesResponse = if body.is_null()
    {   ResponsesResponse::default()
    } else
    {   serde_json::from_value(body).expect("responses body")
    };
    UpstreamReply::Responses(raw)
}

/// A Chat Completions reply from JSON
pub fn chat_reply(body: Value) -> UpstreamReply
{   let raw: ChatResponse = serde_json::from_value(body)
      .expect("chat body");
    UpstreamReply::Chat(raw)
}

pub fn test_config() -> ServerConfig
{   ServerConfig
    {   api_key: "test-key".to_string()
      , ..ServerConfig::default()
    }
}

pub fn state_with(
  config: ServerConfig
, upstream: Arc<FakeUpstream>
) -> ServerState
{   let model = ActiveModelState::unconfigured(&config.fallback_model);
    ServerState::new(config, model, upstream)
}
