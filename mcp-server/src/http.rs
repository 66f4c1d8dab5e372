/// HTTP tool server
///
/// - GET  /health       liveness
/// - GET  /tools        tool definitions
/// - POST /tools/:name  call a tool with the JSON body as arguments

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use travel_core::{definitions, is_error, TravelTools};

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Clone)]
pub struct AppState {
    tools: Arc<TravelTools>,
}

/// HTTP Response wrapper
#[derive(Debug, Serialize)]
struct HttpResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> HttpResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "Travel MCP Server",
        "protocols": ["http", "jsonrpc-stdio"],
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_tools() -> Json<Value> {
    Json(json!({ "tools": definitions() }))
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    if !TravelTools::has_tool(&name) {
        return (
            StatusCode::NOT_FOUND,
            Json(HttpResponse::<Value>::err(format!("Unknown tool: {}", name))),
        );
    }

    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(v) => v,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(HttpResponse::<Value>::err(format!("Invalid JSON body: {}", e))),
                )
            }
        }
    };

    let answer = state.tools.call(&name, arguments).await;
    if is_error(&answer) {
        let message = answer["error"].as_str().unwrap_or("tool failed").to_string();
        (StatusCode::BAD_REQUEST, Json(HttpResponse::<Value>::err(message)))
    } else {
        (StatusCode::OK, Json(HttpResponse::ok(answer)))
    }
}

pub fn router(tools: Arc<TravelTools>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(call_tool))
        .layer(CorsLayer::permissive())
        .with_state(AppState { tools })
}

/// Port from TRAVEL_MCP_PORT, falling back to the default on absence or garbage
pub fn port_from_env() -> u16 {
    match std::env::var("TRAVEL_MCP_PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid TRAVEL_MCP_PORT '{}'", value);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

/// Start HTTP server
pub async fn serve(tools: TravelTools, port: u16) -> Result<()> {
    let app = router(Arc::new(tools));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║               Travel MCP - HTTP Server                     ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");
    println!("✓ Server listening on http://0.0.0.0:{}\n", port);
    println!("Endpoints:");
    println!("  GET    http://localhost:{}/health", port);
    println!("  GET    http://localhost:{}/tools", port);
    for tool in definitions() {
        println!("  POST   http://localhost:{}/tools/{}", port, tool.name);
    }
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
