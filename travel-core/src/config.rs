/// Settings for the upstream APIs
///
/// Built once by the host process and shared by reference with every client.

use crate::error::{Result, TravelError};

pub const DEFAULT_AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
pub const DEFAULT_WEATHER_API_BASE_URL: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct Settings {
    pub amadeus_api_key: String,
    pub amadeus_secret_key: String,
    pub amadeus_base_url: String,
    pub weather_api_key: String,
    pub weather_api_base_url: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from any key lookup.
    ///
    /// Fails with every missing required key listed, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = (
            value("AMADEUS_API_KEY"),
            value("AMADEUS_SECRET_KEY"),
            value("WEATHER_API_KEY"),
        );

        let (amadeus_api_key, amadeus_secret_key, weather_api_key) = match required {
            (Some(api_key), Some(secret_key), Some(weather_key)) => {
                (api_key, secret_key, weather_key)
            }
            (api_key, secret_key, weather_key) => {
                let missing = [
                    ("AMADEUS_API_KEY", api_key.is_none()),
                    ("AMADEUS_SECRET_KEY", secret_key.is_none()),
                    ("WEATHER_API_KEY", weather_key.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(key, _)| key.to_string())
                .collect();
                return Err(TravelError::Configuration { missing });
            }
        };

        Ok(Self {
            amadeus_api_key,
            amadeus_secret_key,
            amadeus_base_url: value("AMADEUS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AMADEUS_BASE_URL.to_string()),
            weather_api_key,
            weather_api_base_url: value("WEATHER_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE_URL.to_string()),
        })
    }
}
