/// JSON-RPC over stdio
///
/// One request per line on stdin, one response per line on stdout.
/// Notifications (requests without an `id`) get no response.

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use travel_core::{definitions, is_error, TravelTools};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

fn success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn failure(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

/// Handle one input line; `None` when no response is due
pub async fn handle_line(tools: &TravelTools, line: &str) -> Option<Value> {
    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("✗ Unparsable JSON-RPC line: {}", e);
            return Some(failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };

    let id = request.get("id").cloned();
    let Some(method) = request.get("method").and_then(|m| m.as_str()) else {
        return Some(failure(
            id.unwrap_or(Value::Null),
            INVALID_REQUEST,
            "Invalid request: missing method",
        ));
    };

    // Notifications such as notifications/initialized
    let Some(id) = id else {
        tracing::debug!("Notification: {}", method);
        return None;
    };

    let response = match method {
        "initialize" => success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "travel-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "ping" => success(id, json!({})),

        "tools/list" => success(id, json!({ "tools": definitions() })),

        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
            match params.get("name").and_then(|n| n.as_str()) {
                Some(name) => {
                    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                    let answer = tools.call(name, arguments).await;
                    success(
                        id,
                        json!({
                            "content": [{
                                "type": "text",
                                "text": answer.to_string()
                            }],
                            "isError": is_error(&answer)
                        }),
                    )
                }
                None => failure(id, INVALID_PARAMS, "Invalid params: missing tool name"),
            }
        }

        _ => failure(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    };

    Some(response)
}

/// Serve JSON-RPC on stdin/stdout until stdin closes
pub async fn run(tools: TravelTools) -> Result<()> {
    tracing::info!("JSON-RPC server reading from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&tools, &line).await {
            stdout.write_all(response.to_string().as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
