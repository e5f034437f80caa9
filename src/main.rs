//! MCP stdio server binary for llm-delegate.

use std::sync::Arc;
use env_logger::{Builder, Env, Target};
use log::info;

use llm_delegate::client::HttpUpstream;
use llm_delegate::providers::Upstream;
use llm_delegate::{resolve_active_model, ServerConfig, ServerState};

async fn run() -> Result<(), llm_delegate::Error>
{   let config = ServerConfig::from_env()?;
    let upstream = Arc::new(HttpUpstream::new(&config)?);

    let model = resolve_active_model(
      config.configured_model.as_deref(),
      &config.fallback_model,
      || upstream.list_models()
    ).await;
    info!(
      "Active model {} ({} API, fallback used: {})",
      model.active_id,
      config.api_variant.as_str(),
      model.fallback_used
    );

    let state = Arc::new(ServerState::new(config, model, upstream));
    llm_delegate::server::run_stdio_server(state).await
}

#[tokio::main]
async fn main()
{   Builder::from_env(Env::default().default_filter_or("info"))
      .target(Target::Stderr)
      .init();

    if let Err(e) = run().await
    {   eprintln!("llm-delegate: {}", e);
        std::process::exit(1);
    }
}
