//! Startup model validation with fallback

use std::future::Future;
use log::{debug, info, warn};
use serde::Serialize;

/// Which model requests use when they do not name one.
/// Resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveModelState
{   /// Override requested through the environment, if any
    pub configured_id: Option<String>
  , /// Model requests default to
    pub active_id: String
  , /// Hardcoded fallback
    pub fallback_id: String
  , /// Whether the override was rejected in favour of the fallback
    pub fallback_used: bool
}

impl ActiveModelState
{   /// State used when nothing is configured
    pub fn unconfigured(fallback_id: &str) -> Self
    {   ActiveModelState
        {   configured_id: None
          , active_id: fallback_id.to_string()
          , fallback_id: fallback_id.to_string()
          , fallback_used: false
        }
    }
}

/// Decide the active model.
///
/// - no override: fallback, without calling `list_models`
/// - override listed: override
/// - override not listed: fallback, `fallback_used` set
/// - listing failed: override anyway, since it could not be checked
pub async fn resolve_active_model<F, Fut>(
  configured_id: Option<&str>
, fallback_id: &str
, list_models: F
) -> ActiveModelState
where
  F: FnOnce() -> Fut
, Fut: Future<Output = Result<Vec<String>, crate::error::Error>>
{   let configured = match configured_id
      .map(str::trim)
      .filter(|id| !id.is_empty())
    {   Some(id) => id.to_string()
      , None => {
          debug!("No model configured, using {}", fallback_id);
          return ActiveModelState::unconfigured(fallback_id);
        }
    };

    match list_models().await
    {   Ok(models) => {
          debug!("Upstream lists {} models", models.len());
          if models.iter().any(|m| m == &configured)
          {   info!("Using configured model {}", configured);
              ActiveModelState
              {   configured_id: Some(configured.clone())
                , active_id: configured
                , fallback_id: fallback_id.to_string()
                , fallback_used: false
              }
          } else
          {   warn!(
                "Configured model '{}' is not available, \
                 falling back to '{}'",
                configured, fallback_id
              );
              ActiveModelState
              {   configured_id: Some(configured)
                , active_id: fallback_id.to_string()
                , fallback_id: fallback_id.to_string()
                , fallback_used: true
              }
          }
        }
      , Err(e) => {
          warn!(
            "Could not validate model '{}' ({}), using it anyway",
            configured, e
          );
          ActiveModelState
          {   configured_id: Some(configured.clone())
            , active_id: configured
            , fallback_id: fallback_id.to_string()
            , fallback_used: false
          }
        }
    }
}
