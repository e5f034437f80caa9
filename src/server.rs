//! MCP over stdio: newline-delimited JSON-RPC 2.0.
//!
//! The read loop answers protocol methods inline and spawns one task per
//! `tools/call`. Every response goes through a channel to a single
//! writer task, so output lines never interleave.

use std::sync::Arc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use log::{debug, trace, error, info, warn};

use crate::tools::{call_tool, tool_list, ServerState, ToolResult};

pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchOutcome
{   NoResponse
  , Response
  , Spawned
  , Exit
}

#[derive(Debug, Clone, Deserialize)]
struct ToolCallParams
{   name: String
  , #[serde(default)]
    arguments: Value
}

/// Serve on the process's stdin/stdout until stdin closes
pub async fn run_stdio_server(
  state: Arc<ServerState>
) -> Result<(), crate::error::Error>
{   let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(state, reader, writer).await.map(|_| ())
}

/// Serve requests from `reader`, writing responses to `writer`.
/// Returns the writer once input is exhausted and every in-flight call
/// has answered.
pub async fn serve<R, W>(
  state: Arc<ServerState>
, reader: R
, writer: W
) -> Result<W, crate::error::Error>
where
  R: AsyncBufRead + Unpin
, W: AsyncWrite + Unpin + Send + 'static
{   info!("MCP server ready");
    let (tx, rx) = mpsc::unbounded_channel::<Value>();
    let writer_task = tokio::spawn(run_writer(rx, writer));

    let mut lines = reader.lines();
    let mut read_error = None;
    loop
    {   let line = match lines.next_line().await
        {   Ok(Some(line)) => line
          , Ok(None) => {
              debug!("Input closed");
              break;
            }
          , Err(e) => {
              error!("Could not read MCP message: {}", e);
              read_error = Some(crate::error::Error::Other(format!(
                "Could not read MCP message: {}", e
              )));
              break;
            }
        };
        let line = line.trim();
        if line.is_empty()
        {   continue;
        }
        trace!("<- {}", line);

        let outcome = match serde_json::from_str::<Value>(line)
        {   Ok(message) => handle_message(&state, message, &tx)
          , Err(e) => {
              warn!("Unparsable MCP message: {}", e);
              send(&tx, jsonrpc_error(
                None,
                PARSE_ERROR,
                &format!("Parse error: {}", e)
              ))
            }
        };
        if outcome == DispatchOutcome::Exit
        {   break;
        }
    }

    // Spawned calls hold their own senders; the writer drains until the
    // last one reports back.
    drop(tx);
    let writer = writer_task.await.map_err(|e| {
      crate::error::Error::Unexpected(e.to_string())
    })??;
    match read_error
    {   Some(e) => Err(e)
      , None => Ok(writer)
    }
}

async fn run_writer<W>(
  mut rx: mpsc::UnboundedReceiver<Value>
, mut writer: W
) -> Result<W, crate::error::Error>
where
  W: AsyncWrite + Unpin
{   while let Some(value) = rx.recv().await
    {   let mut line = serde_json::to_string(&value).map_err(|e| {
          crate::error::Error::ParseError(e.to_string())
        })?;
        trace!("-> {}", line);
        line.push('\n');
        writer.write_all(line.as_bytes()).await.map_err(|e| {
          error!("Could not write MCP response: {}", e);
          crate::error::Error::Other(e.to_string())
        })?;
        writer.flush().await.map_err(|e| {
          crate::error::Error::Other(e.to_string())
        })?;
    }
    Ok(writer)
}

fn send(tx: &mpsc::UnboundedSender<Value>, value: Value) -> DispatchOutcome
{   if tx.send(value).is_err()
    {   error!("Writer task is gone");
    }
    DispatchOutcome::Response
}

pub fn jsonrpc_response(id: Value, result: Value) -> Value
{   json!({
      "jsonrpc": "2.0",
      "id": id,
      "result": result
    })
}

pub fn jsonrpc_error(id: Option<Value>, code: i64, message: &str) -> Value
{   json!({
      "jsonrpc": "2.0",
      "id": id.unwrap_or(Value::Null),
      "error": {
        "code": code,
        "message": message
      }
    })
}

fn handle_message(
  state: &Arc<ServerState>
, message: Value
, tx: &mpsc::UnboundedSender<Value>
) -> DispatchOutcome
{   let Some(obj) = message.as_object() else {
      return send(tx, jsonrpc_error(
        None,
        INVALID_REQUEST,
        "Invalid Request: expected JSON object"
      ));
    };
    let id = obj.get("id").cloned();
    let Some(method) = obj.get("method").and_then(Value::as_str) else {
      if obj.contains_key("result") || obj.contains_key("error")
      {   // A reply to something we never asked; nothing to do.
          return DispatchOutcome::NoResponse;
      }
      return send(tx, jsonrpc_error(
        id,
        INVALID_REQUEST,
        "Invalid Request: missing method field"
      ));
    };
    debug!("Received {}", method);

    match method
    {   "initialize" => {
          let Some(id) = id else {
            return DispatchOutcome::NoResponse;
          };
          let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
              "tools": {
                "listChanged": false
              }
            },
            "serverInfo": {
              "name": crate::SERVER_NAME,
              "version": crate::SERVER_VERSION
            }
          });
          send(tx, jsonrpc_response(id, result))
        }
      , "notifications/initialized" => DispatchOutcome::NoResponse
      , "ping" => match id
        {   Some(id) => send(tx, jsonrpc_response(id, json!({})))
          , None => DispatchOutcome::NoResponse
        }
      , "tools/list" => {
          let Some(id) = id else {
            return DispatchOutcome::NoResponse;
          };
          let tools = tool_list(state.config.api_variant);
          send(tx, jsonrpc_response(id, json!({ "tools": tools })))
        }
      , "tools/call" => {
          let Some(id) = id else {
            return DispatchOutcome::NoResponse;
          };
          let params = obj.get("params").cloned().unwrap_or_else(|| json!({}));
          let call = match serde_json::from_value::<ToolCallParams>(params)
          {   Ok(call) => call
            , Err(e) => {
                return send(tx, jsonrpc_error(
                  Some(id),
                  INVALID_PARAMS,
                  &format!("Invalid params for tools/call: {}", e)
                ));
              }
          };
          spawn_tool_call(Arc::clone(state), id, call, tx.clone());
          DispatchOutcome::Spawned
        }
      , "exit" => DispatchOutcome::Exit
      , _ => match id
        {   Some(id) => send(tx, jsonrpc_error(
              Some(id),
              METHOD_NOT_FOUND,
              &format!("Method '{}' not found", method)
            ))
          , None => DispatchOutcome::NoResponse
        }
    }
}

/// Run one tool call on its own task. The call itself runs in a nested
/// task so a panic still yields an error result instead of silence.
fn spawn_tool_call(
  state: Arc<ServerState>
, id: Value
, call: ToolCallParams
, tx: mpsc::UnboundedSender<Value>
)
{   tokio::spawn(async move {
      let ToolCallParams { name, arguments } = call;
      debug!("Calling tool {}", name);
      let tool_name = name.clone();
      let handle = tokio::spawn(async move {
        call_tool(&state, &tool_name, arguments).await
      });

      let response = match handle.await
      {   Ok(Ok(result)) => jsonrpc_response(id, result.to_value())
        , Ok(Err(e)) => {
            warn!("Rejected {} call: {}", name, e);
            jsonrpc_error(Some(id), INVALID_PARAMS, &e.to_string())
          }
        , Err(join_error) => {
            error!("Tool {} did not complete: {}", name, join_error);
            let detail = panic_detail(join_error);
            let result = ToolResult::failure(
              &crate::error::Error::Unexpected(detail)
            );
            jsonrpc_response(id, result.to_value())
          }
      };
      let _ = send(&tx, response);
    });
}

fn panic_detail(join_error: tokio::task::JoinError) -> String
{   match join_error.try_into_panic()
    {   Ok(payload) => {
          if let Some(s) = payload.downcast_ref::<&str>()
          {   s.to_string()
          } else if let Some(s) = payload.downcast_ref::<String>()
          {   s.clone()
          } else
          {   "tool task panicked".to_string()
          }
        }
      , Err(join_error) => join_error.to_string()
    }
}
