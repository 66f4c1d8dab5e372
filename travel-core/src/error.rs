/// Error types for the travel tools
///
/// Every failure the clients and services can produce is a `TravelError`.
/// Upstream failures keep the provider's machine-readable error code as a
/// structured field so services can classify them with a `match`.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TravelError>;

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("Missing required environment variables: {}", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Failed to get access token: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("API request failed: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
        provider: Option<ProviderError>,
    },

    #[error("Invalid parameter format{}", detail_suffix(.detail))]
    InvalidParameterFormat { detail: Option<String> },

    #[error("Missing required parameters{}", detail_suffix(.detail))]
    MissingRequiredParameters { detail: Option<String> },

    #[error("No matching location found: {location}")]
    LocationNotFound { location: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(": {}", d),
        _ => String::new(),
    }
}

impl TravelError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TravelError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Classified provider code of an upstream failure, if the body carried one
    pub fn provider_code(&self) -> Option<ProviderCode> {
        match self {
            TravelError::RequestFailed {
                provider: Some(p), ..
            } => p.code.map(ProviderCode::from),
            _ => None,
        }
    }

    pub fn provider_detail(&self) -> Option<String> {
        match self {
            TravelError::RequestFailed {
                provider: Some(p), ..
            } => p.detail.clone().or_else(|| p.title.clone()),
            _ => None,
        }
    }
}

/// Machine-readable error reported by an upstream API
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub code: Option<i64>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl ProviderError {
    /// Extract the provider error from a failed response body.
    ///
    /// Amadeus reports `{"errors": [{"code", "title", "detail"}]}`,
    /// WeatherAPI reports `{"error": {"code", "message"}}`.
    pub fn from_body(body: &Value) -> Option<Self> {
        if let Some(first) = body
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|e| e.first())
        {
            return Some(Self {
                code: first.get("code").and_then(as_code),
                title: first.get("title").and_then(|t| t.as_str()).map(String::from),
                detail: first.get("detail").and_then(|d| d.as_str()).map(String::from),
            });
        }

        let error = body.get("error").filter(|e| e.is_object())?;
        Some(Self {
            code: error.get("code").and_then(as_code),
            title: None,
            detail: error.get("message").and_then(|m| m.as_str()).map(String::from),
        })
    }
}

// Amadeus sends numeric codes, some gateways send them as strings
fn as_code(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

/// Provider error codes the services know how to translate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCode {
    /// Amadeus 477
    InvalidFormat,
    /// Amadeus 32171
    MandatoryDataMissing,
    /// WeatherAPI 1006
    NoLocationFound,
    Other(i64),
}

impl From<i64> for ProviderCode {
    fn from(code: i64) -> Self {
        match code {
            477 => ProviderCode::InvalidFormat,
            32171 => ProviderCode::MandatoryDataMissing,
            1006 => ProviderCode::NoLocationFound,
            other => ProviderCode::Other(other),
        }
    }
}
