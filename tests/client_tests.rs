use std::net::SocketAddr;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

use llm_delegate::client::{api_error_message, HttpUpstream};
use llm_delegate::providers::{build_request, Upstream, UpstreamReply};
use llm_delegate::{
  ApiVariant, Error, GenerationRequest, ReasoningEffort, ServerConfig
};

/// Accept one connection, capture the raw request, answer with `body`
async fn respond_once(
  status: &'static str
, body: String
) -> (SocketAddr, JoinHandle<String>)
{   let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.expect("accept");
      let request = read_request(&mut socket).await;
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.expect("write");
      socket.shutdown().await.ok();
      request
    });
    (addr, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String
{   let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop
    {   let n = socket.read(&mut chunk).await.expect("read");
        if n == 0
        {   break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n")
        {   let length = text[..end]
              .lines()
              .filter_map(|l| l.split_once(':'))
              .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
              .and_then(|(_, v)| v.trim().parse::<usize>().ok())
              .unwrap_or(0);
            if buf.len() >= end + 4 + length
            {   break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn config_for(addr: SocketAddr, variant: ApiVariant) -> ServerConfig
{   ServerConfig
    {   api_key: "sk-test".to_string()
      , api_base: format!("http://{}/v1/", addr)
      , api_variant: variant
      , timeout_secs: Some(5)
      , ..ServerConfig::default()
    }
}

#[tokio::test]
async fn test_list_models_sends_bearer_token()
{   let body = json!({
      "object": "list",
      "data": [
        { "id": "gpt-5", "owned_by": "openai" },
        { "id": "gpt-5-mini" }
      ]
    }).to_string();
    let (addr, server) = respond_once("200 OK", body).await;
    let upstream = assert_ok!(
      HttpUpstream::new(&config_for(addr, ApiVariant::Responses))
    );
    assert_eq!(upstream.api_base(), format!("http://{}/v1", addr));

    let models = assert_ok!(upstream.list_models().await);
    assert_eq!(models, vec!["gpt-5".to_string(), "gpt-5-mini".to_string()]);

    let raw = server.await.expect("server task");
    assert!(raw.starts_with("GET /v1/models "));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
}

#[tokio::test]
async fn test_error_status_carries_upstream_message()
{   let body = json!({
      "error": {
        "message": "Incorrect API key provided",
        "type": "invalid_request_error"
      }
    }).to_string();
    let (addr, server) = respond_once("401 Unauthorized", body).await;
    let upstream = assert_ok!(
      HttpUpstream::new(&config_for(addr, ApiVariant::Responses))
    );

    let err = assert_err!(upstream.list_models().await);
    assert_eq!(err, Error::ApiError
    {   status: 401
      , message: "Incorrect API key provided".to_string()
    });
    assert_eq!(err.status(), Some(401));
    server.await.expect("server task");
}

#[tokio::test]
async fn test_chat_generate_posts_to_completions()
{   let body = json!({
      "id": "chatcmpl-1",
      "model": "gpt-5-2025-08-07",
      "choices": [
        {
          "index": 0,
          "message": { "role": "assistant", "content": "Hello!" },
          "finish_reason": "stop"
        }
      ],
      "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
    }).to_string();
    let (addr, server) = respond_once("200 OK", body).await;
    let upstream = assert_ok!(
      HttpUpstream::new(&config_for(addr, ApiVariant::Chat))
    );

    let request = build_request(
      ApiVariant::Chat,
      &GenerationRequest::text("Say hi"),
      "gpt-5",
      ReasoningEffort::Low
    );
    let reply = assert_ok!(upstream.generate(&request).await);
    match reply
    {   UpstreamReply::Chat(raw) => {
          assert_eq!(raw.model.as_deref(), Some("gpt-5-2025-08-07"));
          assert_eq!(raw.choices.map(|c| c.len()), Some(1));
        }
      , other => panic!("expected a chat reply, got {:?}", other)
    }

    let raw = server.await.expect("server task");
    assert!(raw.starts_with("POST /v1/chat/completions "));
    let (_, sent) = raw.split_once("\r\n\r\n").expect("request body");
    let sent: serde_json::Value = assert_ok!(serde_json::from_str(sent));
    assert_eq!(sent["model"], json!("gpt-5"));
    assert_eq!(sent["messages"][0]["content"], json!("Say hi"));
    assert_eq!(sent["reasoning_effort"], json!("low"));
}

#[tokio::test]
async fn test_unanswered_request_times_out()
{   let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
      let (socket, _) = listener.accept().await.expect("accept");
      tokio::time::sleep(std::time::Duration::from_secs(5)).await;
      drop(socket);
    });

    let config = ServerConfig
    {   timeout_secs: Some(1)
      , ..config_for(addr, ApiVariant::Responses)
    };
    let upstream = assert_ok!(HttpUpstream::new(&config));
    let request = build_request(
      ApiVariant::Responses,
      &GenerationRequest::text("Say hi"),
      "gpt-5",
      ReasoningEffort::Low
    );
    let err = assert_err!(upstream.generate(&request).await);
    assert_eq!(err, Error::Timeout);
    server.abort();
}

#[test]
fn test_error_message_fallbacks()
{   assert_eq!(
      api_error_message(r#"{"error":{"message":"model not found"}}"#),
      "model not found"
    );
    assert_eq!(api_error_message("  upstream is down \n"), "upstream is down");
    assert_eq!(api_error_message(r#"{"error":{}}"#), r#"{"error":{}}"#);
    assert_eq!(api_error_message(""), "Unknown error");
}
