/// WeatherAPI client: every request carries the API key as `key`

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use super::ApiClient;
use crate::config::Settings;
use crate::error::Result;
use crate::http::{Params, Transport};

pub struct WeatherApiClient {
    api: ApiClient,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(settings.weather_api_base_url.clone(), transport),
            api_key: settings.weather_api_key.clone(),
        }
    }

    pub async fn get(&self, endpoint: &str, mut params: Params) -> Result<Value> {
        params.push(("key".to_string(), self.api_key.clone()));
        self.api
            .request(Method::GET, endpoint, params, Vec::new(), None)
            .await
    }
}
