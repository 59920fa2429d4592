use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::protocol::{
    error_response, success_response, JsonRpcRequest, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::state::AppState;
use crate::tools;

/// Serve MCP over stdio: JSON-RPC 2.0, one message per line. Tool calls run
/// in their own tasks so a slow provider delays only its own invocation;
/// all responses funnel through a single writer task.
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<Value>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            let mut line = message.to_string();
            line.push('\n');
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    info!("Flight deals MCP server running on stdio");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                let _ = tx
                    .send(error_response(
                        Value::Null,
                        PARSE_ERROR,
                        &format!("parse error: {}", e),
                    ))
                    .await;
                continue;
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "notification received");
            continue;
        }
        let JsonRpcRequest {
            id, method, params, ..
        } = request;
        let id = id.unwrap_or(Value::Null);

        match method.as_str() {
            "initialize" => {
                let result = json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": "farelink-mcp",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                });
                let _ = tx.send(success_response(id, result)).await;
            }
            "ping" => {
                let _ = tx.send(success_response(id, json!({}))).await;
            }
            "tools/list" => {
                let _ = tx
                    .send(success_response(id, json!({ "tools": tools::catalog() })))
                    .await;
            }
            "tools/call" => {
                // Each invocation is independent; don't let one call's
                // upstream latency hold up the read loop.
                let state = Arc::clone(&state);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = handle_tool_call(&state, id, &params).await;
                    let _ = tx.send(response).await;
                });
            }
            other => {
                let _ = tx
                    .send(error_response(
                        id,
                        METHOD_NOT_FOUND,
                        &format!("method not found: {}", other),
                    ))
                    .await;
            }
        }
    }

    drop(tx);
    if let Err(e) = writer.await {
        error!("writer task failed: {}", e);
    }
    Ok(())
}

async fn handle_tool_call(state: &AppState, id: Value, params: &Value) -> Value {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return error_response(id, INVALID_PARAMS, "missing tool name");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match tools::dispatch(state, name, &arguments).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(result) => success_response(id, result),
            Err(e) => error_response(id, INVALID_PARAMS, &format!("serialization failed: {}", e)),
        },
        Err(err) => error_response(id, INVALID_PARAMS, &err.to_string()),
    }
}
