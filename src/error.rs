use std::fmt;

/// Custom error type for llm-delegate operations
/// Implements Clone so results can cross task boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Required credential variable is missing or blank
    MissingApiKey(String)
  , /// Invalid configuration value
    InvalidConfiguration(String)
  , /// Tool arguments failed validation
    Validation(String)
  , /// Transport-level HTTP failure
    HttpError(String)
  , /// Upstream answered with a non-success status
    ApiError
    {   status: u16
      , message: String
    }
  , /// Failed to parse an upstream response
    ParseError(String)
  , /// Timeout error
    Timeout
  , /// A tool task died without producing a result
    Unexpected(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// HTTP status carried by the error, if it came from the upstream.
    pub fn status(&self) -> Option<u16>
    {   match self
        {   Error::ApiError { status, .. } => Some(*status)
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(var) => {
              write!(f, "Missing API key: set {}", var)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Validation(msg) => {
              write!(f, "Invalid arguments: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, message } => {
              write!(f, "API error ({}): {}", status, message)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timeout")
            }
          , Error::Unexpected(value) => {
              write!(f, "{}", value)
            }
          , Error::Other(msg) => {
              write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

// ===== Classification =====

/// Closed set of failure categories shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   InvalidCredentials
  , QuotaExceeded
  , PermissionDenied
  , ModelNotFound
  , RateLimited
  , Timeout
  , Upstream
  , Generic
  , Unexpected
}

/// An actionable, caller-facing description of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError
{   pub kind: ErrorKind
  , pub message: String
}

impl fmt::Display for ClassifiedError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   write!(f, "{}", self.message)
    }
}

/// Map any failure onto a caller-facing message. First match wins:
/// well-known statuses, then anything mentioning a timeout, then the
/// remaining upstream statuses, then plain messages.
pub fn classify(error: &Error) -> ClassifiedError
{   let known = match error.status()
    {   Some(401) => Some((
          ErrorKind::InvalidCredentials
        , "Error: Invalid API key. Check that OPENAI_API_KEY \
           is set correctly."
        ))
      , Some(402) => Some((
          ErrorKind::QuotaExceeded
        , "Error: Quota exceeded. Check your plan and billing \
           details."
        ))
      , Some(403) => Some((
          ErrorKind::PermissionDenied
        , "Error: Permission denied. Your API key does not have \
           access to the requested model."
        ))
      , Some(404) => Some((
          ErrorKind::ModelNotFound
        , "Error: Model not found. Check the model name or call \
           the status tool to see the active model."
        ))
      , Some(429) => Some((
          ErrorKind::RateLimited
        , "Error: Rate limit exceeded. Please wait before making \
           more requests."
        ))
      , _ => None
    };
    if let Some((kind, message)) = known
    {   return ClassifiedError
        {   kind
          , message: message.to_string()
        };
    }

    if error.to_string().to_ascii_lowercase().contains("timeout")
    {   return ClassifiedError
        {   kind: ErrorKind::Timeout
          , message: "Error: Request timed out. Try again or lower \
                      max_output_tokens."
              .to_string()
        };
    }

    match error
    {   Error::ApiError { status, message } => ClassifiedError
        {   kind: ErrorKind::Upstream
          , message: format!(
              "Error: API error ({}): {}", status, message
            )
        }
      , Error::Unexpected(value) => ClassifiedError
        {   kind: ErrorKind::Unexpected
          , message: format!(
              "Error: Unexpected error occurred: {}", value
            )
        }
      , other => ClassifiedError
        {   kind: ErrorKind::Generic
          , message: format!("Error: {}", other)
        }
    }
}
