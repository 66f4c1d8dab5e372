/// Amadeus client with lazily fetched bearer token
///
/// The first protected call fetches a token with the client-credentials
/// grant; later calls reuse it. When the token response carries
/// `expires_in`, the token is fetched again shortly before it expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use super::ApiClient;
use crate::config::Settings;
use crate::error::{Result, TravelError};
use crate::http::{Body, Params, Transport};

pub const TOKEN_ENDPOINT: &str = "/v1/security/oauth2/token";

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now + EXPIRY_MARGIN < expires_at,
            None => true,
        }
    }
}

pub struct AmadeusClient {
    api: ApiClient,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl AmadeusClient {
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(settings.amadeus_base_url.clone(), transport),
            client_id: settings.amadeus_api_key.clone(),
            client_secret: settings.amadeus_secret_key.clone(),
            token: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// Whether a token is currently cached
    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Return the cached token, fetching one if none is cached or it expired.
    ///
    /// The lock is held across the fetch so concurrent callers wait for a
    /// single token request instead of issuing their own.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
            tracing::info!("Amadeus access token expired, fetching a new one");
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        tracing::info!("→ Requesting Amadeus access token");

        let form = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ];
        let requested_at = Instant::now();

        let response = self
            .api
            .request(
                Method::POST,
                TOKEN_ENDPOINT,
                Vec::new(),
                vec![(
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                )],
                Some(Body::Form(form)),
            )
            .await
            .map_err(|e| TravelError::AuthenticationFailed {
                reason: e.to_string(),
            })?;

        let parsed: TokenResponse =
            serde_json::from_value(response).map_err(|e| TravelError::AuthenticationFailed {
                reason: format!("Malformed token response: {}", e),
            })?;

        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TravelError::AuthenticationFailed {
                reason: "Token response has no access_token".to_string(),
            })?;

        tracing::info!("✓ Amadeus access token acquired");

        // An expiry too far out to represent counts as no expiry
        Ok(AccessToken {
            value,
            expires_at: parsed
                .expires_in
                .and_then(|secs| requested_at.checked_add(Duration::from_secs(secs))),
        })
    }

    /// Call a protected endpoint with the bearer token attached
    pub async fn authenticated_request(
        &self,
        method: Method,
        endpoint: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<Value> {
        let token = self.access_token().await?;
        self.api
            .request(
                method,
                endpoint,
                params,
                vec![("Authorization".to_string(), format!("Bearer {}", token))],
                body.map(Body::Json),
            )
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use serde_json::json;

    pub fn test_settings() -> Settings {
        Settings {
            amadeus_api_key: "client-id".to_string(),
            amadeus_secret_key: "client-secret".to_string(),
            amadeus_base_url: "https://amadeus.test".to_string(),
            weather_api_key: "weather-key".to_string(),
            weather_api_base_url: "https://weather.test/v1".to_string(),
        }
    }

    pub fn token_response() -> Value {
        json!({"type": "amadeusOAuth2Token", "access_token": "tok-123", "expires_in": 1799})
    }

    #[tokio::test]
    async fn test_token_fetched_once_across_calls() {
        let transport = Arc::new(FakeTransport::new());
        transport
            .push_ok(token_response())
            .push_ok(json!({"data": []}))
            .push_ok(json!({"data": []}))
            .push_ok(json!({"data": []}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        assert!(!client.is_authenticated().await);
        for _ in 0..3 {
            client
                .authenticated_request(Method::GET, "/v2/shopping/flight-offers", vec![], None)
                .await
                .unwrap();
        }
        assert!(client.is_authenticated().await);

        assert_eq!(transport.count_to(TOKEN_ENDPOINT), 1);
        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        for request in &requests[1..] {
            assert_eq!(request.header_value("Authorization"), Some("Bearer tok-123"));
        }
    }

    #[tokio::test]
    async fn test_token_request_uses_client_credentials_form() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(token_response()).push_ok(json!({}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        client
            .authenticated_request(Method::GET, "/v1/anything", vec![], None)
            .await
            .unwrap();

        let token_request = &transport.requests()[0];
        assert_eq!(token_request.method, Method::POST);
        assert_eq!(token_request.url, "https://amadeus.test/v1/security/oauth2/token");
        assert_eq!(
            token_request.body,
            Some(Body::Form(vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("client_id".to_string(), "client-id".to_string()),
                ("client_secret".to_string(), "client-secret".to_string()),
            ]))
        );
    }

    #[tokio::test]
    async fn test_failed_token_fetch_stays_unauthenticated() {
        let transport = Arc::new(FakeTransport::new());
        transport
            .push_err(TravelError::RequestFailed {
                status: Some(401),
                message: "401 Unauthorized".to_string(),
                provider: None,
            })
            .push_ok(token_response())
            .push_ok(json!({"data": []}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        let err = client
            .authenticated_request(Method::GET, "/v1/anything", vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::AuthenticationFailed { .. }));
        assert!(!client.is_authenticated().await);

        // The next call retries the token fetch
        client
            .authenticated_request(Method::GET, "/v1/anything", vec![], None)
            .await
            .unwrap();
        assert_eq!(transport.count_to(TOKEN_ENDPOINT), 2);
    }

    #[tokio::test]
    async fn test_missing_access_token_is_authentication_failure() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(json!({"error": "invalid_client"}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        let err = client
            .authenticated_request(Method::GET, "/v1/anything", vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::AuthenticationFailed { .. }));
        // Only the token request went out
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed() {
        let transport = Arc::new(FakeTransport::new());
        transport
            .push_ok(json!({"access_token": "short", "expires_in": 5}))
            .push_ok(json!({}))
            .push_ok(json!({"access_token": "fresh", "expires_in": 1799}))
            .push_ok(json!({}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        for _ in 0..2 {
            client
                .authenticated_request(Method::GET, "/v1/anything", vec![], None)
                .await
                .unwrap();
        }

        assert_eq!(transport.count_to(TOKEN_ENDPOINT), 2);
        let last = transport.requests().pop().unwrap();
        assert_eq!(last.header_value("Authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn test_huge_expires_in_keeps_token() {
        let transport = Arc::new(FakeTransport::new());
        transport
            .push_ok(json!({"access_token": "forever", "expires_in": u64::MAX}))
            .push_ok(json!({}))
            .push_ok(json!({}));
        let client = AmadeusClient::new(&test_settings(), transport.clone());

        for _ in 0..2 {
            client
                .authenticated_request(Method::GET, "/v1/anything", vec![], None)
                .await
                .unwrap();
        }

        assert_eq!(transport.count_to(TOKEN_ENDPOINT), 1);
        let last = transport.requests().pop().unwrap();
        assert_eq!(last.header_value("Authorization"), Some("Bearer forever"));
    }

    #[test]
    fn test_token_without_expiry_never_goes_stale() {
        let token = AccessToken {
            value: "tok".to_string(),
            expires_at: None,
        };
        assert!(token.is_fresh(Instant::now() + Duration::from_secs(86_400)));
    }
}
