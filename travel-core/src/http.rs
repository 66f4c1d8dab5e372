/// HTTP transport for the upstream APIs
///
/// One request in, one JSON document out. Any transport failure, non-2xx
/// status or non-JSON body becomes `TravelError::RequestFailed`. No retries.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::error::{ProviderError, Result, TravelError};

/// Ordered query parameters for one request
pub type Params = Vec<(String, String)>;

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// A fully resolved request ready to send
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, if present
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        let HttpRequest {
            method,
            url,
            params,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.clone(), &url);
        if !params.is_empty() {
            builder = builder.query(&params);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            Some(Body::Json(json)) => builder.json(&json),
            Some(Body::Form(fields)) => builder.form(&fields),
            None => builder,
        };

        // reqwest errors carry the full URL, whose query may hold an API key
        let response = builder.send().await.map_err(|e| TravelError::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: format!("{} ({} {})", e.without_url(), method, url),
            provider: None,
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TravelError::RequestFailed {
                status: Some(status.as_u16()),
                message: format!("Failed to read response: {}", e.without_url()),
                provider: None,
            })?;

        tracing::debug!(
            "{} {} → status {}, {} bytes",
            method,
            url,
            status,
            text.len()
        );

        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let provider = parsed.as_ref().ok().and_then(ProviderError::from_body);
            return Err(TravelError::RequestFailed {
                status: Some(status.as_u16()),
                message: format!("{} for url {}: {}", status, url, text),
                provider,
            });
        }

        parsed.map_err(|e| TravelError::RequestFailed {
            status: Some(status.as_u16()),
            message: format!("Failed to parse response from {}: {}", url, e),
            provider: None,
        })
    }
}
