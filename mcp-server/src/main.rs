/// Travel MCP Server - JSON-RPC (stdio) + HTTP API
///
/// Exposes the travel tools over two transports:
/// 1. HTTP endpoints (default)
/// 2. JSON-RPC over stdin/stdout (for direct MCP protocol)
///
/// Run with HTTP: ./travel-mcp
/// Run with MCP:  TRAVEL_MCP_MODE=jsonrpc ./travel-mcp
///
/// Logs go to stderr; RUST_LOG overrides the default `info` filter.

mod http;
mod rpc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use travel_core::{Settings, TravelTools};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Http,
    JsonRpc,
}

impl Mode {
    fn from_env() -> Self {
        match std::env::var("TRAVEL_MCP_MODE").as_deref() {
            Ok("jsonrpc") => Mode::JsonRpc,
            Ok("http") | Err(_) => Mode::Http,
            Ok(other) => {
                tracing::warn!("Unknown TRAVEL_MCP_MODE '{}', using http", other);
                Mode::Http
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env().context("Failed to load settings")?;
    tracing::info!(
        "Amadeus at {}, WeatherAPI at {}",
        settings.amadeus_base_url,
        settings.weather_api_base_url
    );
    let tools = TravelTools::from_settings(&settings);

    match Mode::from_env() {
        Mode::JsonRpc => rpc::run(tools).await,
        Mode::Http => http::serve(tools, http::port_from_env()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tools wired to unroutable upstreams; only offline tools succeed
    pub fn offline_tools() -> TravelTools {
        TravelTools::from_settings(&Settings {
            amadeus_api_key: "id".to_string(),
            amadeus_secret_key: "secret".to_string(),
            amadeus_base_url: "http://127.0.0.1:9".to_string(),
            weather_api_key: "key".to_string(),
            weather_api_base_url: "http://127.0.0.1:9/v1".to_string(),
        })
    }
}
