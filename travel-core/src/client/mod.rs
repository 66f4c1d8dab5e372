/// API clients
///
/// `ApiClient` resolves endpoints against a base URL and logs every call.
/// `AmadeusClient` adds bearer-token authentication on top of it,
/// `WeatherApiClient` adds the API key query parameter.

pub mod amadeus;
pub mod weather;

pub use amadeus::AmadeusClient;
pub use weather::WeatherApiClient;

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::error::Result;
use crate::http::{Body, HttpRequest, Params, Transport};

/// Base client shared by every upstream API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Params,
        headers: Vec<(String, String)>,
        body: Option<Body>,
    ) -> Result<Value> {
        let mut request = HttpRequest::new(method.clone(), self.url(endpoint)).params(params);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        tracing::debug!("→ {} {}", method, request.url);

        match self.transport.send(request).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("✗ {} {} failed: {}", method, endpoint, e);
                Err(e)
            }
        }
    }
}
