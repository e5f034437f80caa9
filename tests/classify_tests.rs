use llm_delegate::{classify, Error, ErrorKind};

fn api(status: u16, message: &str) -> Error
{   Error::ApiError
    {   status
      , message: message.to_string()
    }
}

#[test]
fn test_known_statuses()
{   let cases = [
      (401, ErrorKind::InvalidCredentials, "Invalid API key.")
    , (402, ErrorKind::QuotaExceeded, "Quota exceeded")
    , (403, ErrorKind::PermissionDenied, "Permission denied")
    , (404, ErrorKind::ModelNotFound, "Model not found")
    , (429, ErrorKind::RateLimited, "Rate limit exceeded")
    ];
    for (status, kind, needle) in cases
    {   let classified = classify(&api(status, "upstream said no"));
        assert_eq!(classified.kind, kind, "status {}", status);
        assert!(
          classified.message.contains(needle),
          "status {} gave {}", status, classified.message
        );
    }
}

#[test]
fn test_classification_is_deterministic()
{   for status in [401, 404, 429, 500]
    {   let first = classify(&api(status, "a"));
        let second = classify(&api(status, "a"));
        assert_eq!(first, second);
    }
}

#[test]
fn test_status_beats_timeout_wording()
{   let classified = classify(&api(429, "timeout while queueing"));
    assert_eq!(classified.kind, ErrorKind::RateLimited);
}

#[test]
fn test_timeout_detection()
{   assert_eq!(classify(&Error::Timeout).kind, ErrorKind::Timeout);
    assert_eq!(
      classify(&api(504, "Gateway Timeout")).kind,
      ErrorKind::Timeout
    );
    assert_eq!(
      classify(&Error::HttpError("connect TIMEOUT".to_string())).kind,
      ErrorKind::Timeout
    );
    assert!(classify(&Error::Timeout).message.contains("timed out"));
}

#[test]
fn test_other_statuses_keep_upstream_message()
{   let classified = classify(&api(500, "The server had an error"));
    assert_eq!(classified.kind, ErrorKind::Upstream);
    assert_eq!(
      classified.message,
      "Error: API error (500): The server had an error"
    );
}

#[test]
fn test_plain_errors_pass_through()
{   let classified = classify(&Error::Other("connection refused".into()));
    assert_eq!(classified.kind, ErrorKind::Generic);
    assert_eq!(classified.message, "Error: connection refused");

    let classified = classify(&Error::ParseError("bad json".into()));
    assert_eq!(classified.kind, ErrorKind::Generic);
    assert!(classified.message.starts_with("Error: "));
}

#[test]
fn test_unexpected_values()
{   let classified = classify(&Error::Unexpected("boom".to_string()));
    assert_eq!(classified.kind, ErrorKind::Unexpected);
    assert_eq!(
      classified.message,
      "Error: Unexpected error occurred: boom"
    );
}
