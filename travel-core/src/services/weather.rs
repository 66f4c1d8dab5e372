/// Weather forecasts from WeatherAPI

use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{integer, items, number, parse_date, text, DATE_FORMAT};
use crate::client::WeatherApiClient;
use crate::error::{ProviderCode, Result, TravelError};

pub const FORECAST_ENDPOINT: &str = "/forecast.json";
pub const FUTURE_ENDPOINT: &str = "/future.json";
pub const CURRENT_ENDPOINT: &str = "/current.json";

pub const MIN_FORECAST_DAYS: i64 = 1;
pub const MAX_FORECAST_DAYS: i64 = 14;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WeatherRequest {
    /// City name, lat/lon, postcode or `iata:<code>` (e.g. London, 51.5,-0.1)
    pub location: String,
    /// Specific date in YYYY-MM-DD format; omit for a multi-day forecast
    #[serde(default)]
    pub date: Option<String>,
    /// Number of forecast days when no date is given (1-14, default 7)
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CurrentWeatherRequest {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub tz_id: Option<String>,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: Location,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: Option<String>,
    pub day: DaySummary,
    pub astro: Astro,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub totalsnow_cm: f64,
    pub daily_chance_of_rain: Option<i64>,
    pub daily_chance_of_snow: Option<i64>,
    pub condition: Option<String>,
    pub uv: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Astro {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub moon_phase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temp_c: Option<f64>,
    pub is_day: Option<i64>,
    pub condition: Option<String>,
    pub humidity: Option<i64>,
    pub cloud: Option<i64>,
    pub feelslike_c: Option<f64>,
    pub uv: Option<f64>,
}

/// Which WeatherAPI call answers a weather request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherQuery {
    /// Multi-day forecast starting today
    Forecast { days: i64 },
    /// One day inside the forecast window
    ForecastOn { date: NaiveDate, days: i64 },
    /// One day beyond the forecast window
    Future { date: NaiveDate },
}

impl WeatherQuery {
    /// Choose the call for `date` relative to `today`
    pub fn plan(date: Option<NaiveDate>, days: i64, today: NaiveDate) -> Result<Self> {
        let Some(date) = date else {
            return Ok(WeatherQuery::Forecast {
                days: clamp_days(days),
            });
        };

        let offset = (date - today).num_days();
        match offset {
            o if o < 0 => Err(TravelError::validation(
                "date",
                format!("{} is in the past", date.format(DATE_FORMAT)),
            )),
            o if o < MAX_FORECAST_DAYS => Ok(WeatherQuery::ForecastOn { date, days: o + 1 }),
            _ => Ok(WeatherQuery::Future { date }),
        }
    }
}

pub fn clamp_days(days: i64) -> i64 {
    days.clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS)
}

pub struct WeatherService {
    client: WeatherApiClient,
}

impl WeatherService {
    pub fn new(client: WeatherApiClient) -> Self {
        Self { client }
    }

    pub async fn forecast(&self, location: &str, days: i64) -> Result<WeatherReport> {
        let location = location_query(location)?;
        let days = clamp_days(days);
        tracing::info!("→ Getting {}-day forecast for {}", days, location);

        let response = self
            .fetch(
                FORECAST_ENDPOINT,
                &location,
                vec![("days".into(), days.to_string()), ("aqi".into(), "no".into())],
            )
            .await?;

        let report = normalize_forecast(&response);
        tracing::info!("✓ Got {} forecast days", report.forecast.len());
        Ok(report)
    }

    pub async fn future(&self, location: &str, date: &str) -> Result<WeatherReport> {
        let location = location_query(location)?;
        let date = parse_date("date", date)?;
        tracing::info!("→ Getting future weather for {} on {}", location, date);

        let response = self
            .fetch(
                FUTURE_ENDPOINT,
                &location,
                vec![("dt".into(), date.format(DATE_FORMAT).to_string())],
            )
            .await?;

        Ok(normalize_future(&response))
    }

    pub async fn current(&self, location: &str) -> Result<CurrentWeather> {
        let location = location_query(location)?;
        tracing::info!("→ Getting current weather for {}", location);

        let response = self.fetch(CURRENT_ENDPOINT, &location, Vec::new()).await?;
        Ok(normalize_current(&response))
    }

    /// Forecast, single forecast day or future prediction depending on the date
    pub async fn weather(&self, request: &WeatherRequest) -> Result<WeatherReport> {
        let today = Utc::now().date_naive();
        let date = request
            .date
            .as_deref()
            .map(|d| parse_date("date", d))
            .transpose()?;

        match WeatherQuery::plan(date, request.days, today)? {
            WeatherQuery::Forecast { days } => self.forecast(&request.location, days).await,
            WeatherQuery::ForecastOn { date, days } => {
                let location = location_query(&request.location)?;
                tracing::info!("→ Getting forecast for {} on {}", location, date);
                let response = self
                    .fetch(
                        FORECAST_ENDPOINT,
                        &location,
                        vec![
                            ("days".into(), days.to_string()),
                            ("dt".into(), date.format(DATE_FORMAT).to_string()),
                            ("aqi".into(), "no".into()),
                        ],
                    )
                    .await?;
                Ok(normalize_forecast(&response))
            }
            WeatherQuery::Future { date } => {
                self.future(&request.location, &date.format(DATE_FORMAT).to_string())
                    .await
            }
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        location: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Value> {
        params.insert(0, ("q".to_string(), location.to_string()));
        self.client.get(endpoint, params).await.map_err(|e| {
            tracing::error!("✗ Weather request for {} failed: {}", location, e);
            classify_weather_error(e, location)
        })
    }
}

fn location_query(location: &str) -> Result<String> {
    let location = location.trim();
    if location.is_empty() {
        return Err(TravelError::validation("location", "must not be empty"));
    }
    Ok(location.to_string())
}

fn classify_weather_error(err: TravelError, location: &str) -> TravelError {
    match err.provider_code() {
        Some(ProviderCode::NoLocationFound) => TravelError::LocationNotFound {
            location: location.to_string(),
        },
        Some(ProviderCode::InvalidFormat)
        | Some(ProviderCode::MandatoryDataMissing)
        | Some(ProviderCode::Other(_))
        | None => err,
    }
}

fn normalize_location(response: &Value) -> Location {
    Location {
        name: text(response, "/location/name"),
        region: text(response, "/location/region"),
        country: text(response, "/location/country"),
        lat: number(response, "/location/lat"),
        lon: number(response, "/location/lon"),
        tz_id: text(response, "/location/tz_id"),
        localtime: text(response, "/location/localtime"),
    }
}

fn normalize_day(day: &Value) -> ForecastDay {
    ForecastDay {
        date: text(day, "/date"),
        day: DaySummary {
            maxtemp_c: number(day, "/day/maxtemp_c"),
            mintemp_c: number(day, "/day/mintemp_c"),
            totalsnow_cm: number(day, "/day/totalsnow_cm").unwrap_or(0.0),
            daily_chance_of_rain: integer(day, "/day/daily_chance_of_rain"),
            daily_chance_of_snow: integer(day, "/day/daily_chance_of_snow"),
            condition: text(day, "/day/condition/text"),
            uv: number(day, "/day/uv"),
        },
        astro: Astro {
            sunrise: text(day, "/astro/sunrise"),
            sunset: text(day, "/astro/sunset"),
            moon_phase: text(day, "/astro/moon_phase"),
        },
    }
}

pub fn normalize_forecast(response: &Value) -> WeatherReport {
    WeatherReport {
        location: normalize_location(response),
        forecast: items(response, "/forecast/forecastday")
            .iter()
            .map(normalize_day)
            .collect(),
    }
}

/// Future responses carry a single day; only the first is kept
pub fn normalize_future(response: &Value) -> WeatherReport {
    WeatherReport {
        location: normalize_location(response),
        forecast: items(response, "/forecast/forecastday")
            .first()
            .map(normalize_day)
            .into_iter()
            .collect(),
    }
}

pub fn normalize_current(response: &Value) -> CurrentWeather {
    CurrentWeather {
        location: normalize_location(response),
        current: CurrentConditions {
            temp_c: number(response, "/current/temp_c"),
            is_day: integer(response, "/current/is_day"),
            condition: text(response, "/current/condition/text"),
            humidity: integer(response, "/current/humidity"),
            cloud: integer(response, "/current/cloud"),
            feelslike_c: number(response, "/current/feelslike_c"),
            uv: number(response, "/current/uv"),
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::amadeus::tests::test_settings;
    use crate::error::ProviderError;
    use crate::http::testing::FakeTransport;
    use serde_json::json;
    use std::sync::Arc;

    pub fn raw_forecast() -> Value {
        json!({
            "location": {
                "name": "London", "region": "City of London, Greater London",
                "country": "United Kingdom", "lat": 51.52, "lon": -0.11,
                "tz_id": "Europe/London", "localtime": "2025-06-01 10:00"
            },
            "current": {"temp_c": 17.0},
            "forecast": {"forecastday": [{
                "date": "2025-06-01",
                "day": {
                    "maxtemp_c": 21.4, "mintemp_c": 12.1,
                    "daily_chance_of_rain": 80, "daily_chance_of_snow": 0,
                    "condition": {"text": "Patchy rain nearby", "code": 1063},
                    "uv": 5.0
                },
                "astro": {"sunrise": "04:47 AM", "sunset": "09:08 PM", "moon_phase": "Waxing Crescent"}
            }, {
                "date": "2025-06-02",
                "day": {"maxtemp_c": 23.0, "totalsnow_cm": 0.4}
            }]}
        })
    }

    fn service(transport: Arc<FakeTransport>) -> WeatherService {
        WeatherService::new(WeatherApiClient::new(&test_settings(), transport))
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_days_are_clamped() {
        assert_eq!(clamp_days(30), 14);
        assert_eq!(clamp_days(0), 1);
        assert_eq!(clamp_days(-3), 1);
        assert_eq!(clamp_days(7), 7);
    }

    #[tokio::test]
    async fn test_forecast_request_clamps_days() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(raw_forecast()).push_ok(raw_forecast());
        let service = service(transport.clone());

        service.forecast("London", 30).await.unwrap();
        service.forecast("London", 0).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].param("days"), Some("14"));
        assert_eq!(requests[1].param("days"), Some("1"));
        assert_eq!(requests[0].param("q"), Some("London"));
        assert_eq!(requests[0].param("aqi"), Some("no"));
        assert!(requests[0].url.ends_with(FORECAST_ENDPOINT));
    }

    #[test]
    fn test_normalize_forecast() {
        let report = normalize_forecast(&raw_forecast());
        assert_eq!(report.location.name.as_deref(), Some("London"));
        assert_eq!(report.location.lon, Some(-0.11));
        assert_eq!(report.forecast.len(), 2);

        let first = &report.forecast[0];
        assert_eq!(first.day.condition.as_deref(), Some("Patchy rain nearby"));
        assert_eq!(first.day.daily_chance_of_rain, Some(80));
        assert_eq!(first.day.totalsnow_cm, 0.0);
        assert_eq!(first.astro.moon_phase.as_deref(), Some("Waxing Crescent"));

        let second = &report.forecast[1];
        assert_eq!(second.day.totalsnow_cm, 0.4);
        assert_eq!(second.day.mintemp_c, None);
        assert_eq!(second.astro.sunrise, None);
    }

    #[test]
    fn test_normalize_future_keeps_one_day() {
        let report = normalize_future(&raw_forecast());
        assert_eq!(report.forecast.len(), 1);
        assert_eq!(report.forecast[0].date.as_deref(), Some("2025-06-01"));

        assert!(normalize_future(&json!({})).forecast.is_empty());
    }

    #[tokio::test]
    async fn test_current_weather() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(json!({
            "location": {"name": "Paris"},
            "current": {
                "temp_c": 18.5, "is_day": 1, "condition": {"text": "Sunny"},
                "humidity": 40, "cloud": 0, "feelslike_c": 18.0, "uv": 6.0
            }
        }));

        let weather = service(transport.clone()).current("Paris").await.unwrap();
        assert_eq!(weather.location.name.as_deref(), Some("Paris"));
        assert_eq!(weather.current.condition.as_deref(), Some("Sunny"));
        assert_eq!(weather.current.is_day, Some(1));
        assert!(transport.requests()[0].url.ends_with(CURRENT_ENDPOINT));
    }

    #[test]
    fn test_query_plan() {
        let today = day("2025-06-01");

        assert_eq!(
            WeatherQuery::plan(None, 30, today).unwrap(),
            WeatherQuery::Forecast { days: 14 }
        );
        assert_eq!(
            WeatherQuery::plan(Some(day("2025-06-01")), 7, today).unwrap(),
            WeatherQuery::ForecastOn { date: day("2025-06-01"), days: 1 }
        );
        assert_eq!(
            WeatherQuery::plan(Some(day("2025-06-14")), 7, today).unwrap(),
            WeatherQuery::ForecastOn { date: day("2025-06-14"), days: 14 }
        );
        assert_eq!(
            WeatherQuery::plan(Some(day("2025-06-15")), 7, today).unwrap(),
            WeatherQuery::Future { date: day("2025-06-15") }
        );

        let err = WeatherQuery::plan(Some(day("2025-05-31")), 7, today).unwrap_err();
        assert!(matches!(err, TravelError::Validation { field: "date", .. }));
    }

    #[tokio::test]
    async fn test_far_date_uses_future_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(raw_forecast());
        let date = (Utc::now().date_naive() + chrono::Duration::days(60))
            .format(DATE_FORMAT)
            .to_string();

        service(transport.clone())
            .weather(&WeatherRequest {
                location: "Tokyo".into(),
                date: Some(date.clone()),
                days: 7,
            })
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert!(request.url.ends_with(FUTURE_ENDPOINT));
        assert_eq!(request.param("dt"), Some(date.as_str()));
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_request() {
        let transport = Arc::new(FakeTransport::new());
        let service = service(transport.clone());

        let err = service.forecast("   ", 3).await.unwrap_err();
        assert!(matches!(err, TravelError::Validation { field: "location", .. }));

        let err = service
            .weather(&WeatherRequest {
                location: "Tokyo".into(),
                date: Some("next friday".into()),
                days: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::Validation { field: "date", .. }));

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_location_is_location_not_found() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_err(TravelError::RequestFailed {
            status: Some(400),
            message: "400 Bad Request".to_string(),
            provider: Some(ProviderError {
                code: Some(1006),
                title: None,
                detail: Some("No matching location found.".to_string()),
            }),
        });

        let err = service(transport).forecast("Atlantis", 3).await.unwrap_err();
        match err {
            TravelError::LocationNotFound { location } => assert_eq!(location, "Atlantis"),
            other => panic!("expected LocationNotFound, got {other:?}"),
        }
    }
}
