/// Tool functions exposed to the agent
///
/// Every tool calls exactly one operation and answers with a JSON mapping:
/// `{<payload key>: result}` on success or `{"error": message}` on failure.
/// Errors never escape a tool.

use std::sync::Arc;

use chrono::Utc;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::booking::{simulate_booking, BookingRequest};
use crate::client::{AmadeusClient, WeatherApiClient};
use crate::config::Settings;
use crate::datetime::current_timestamp;
use crate::error::Result;
use crate::http::{ReqwestTransport, Transport};
use crate::services::weather::CurrentWeatherRequest;
use crate::services::{
    CheapestDatesSearch, FlightSearch, FlightService, HotelSearch, HotelService, TravelPlanRequest,
    TravelPlanService, WeatherRequest, WeatherService,
};

/// Arguments of `get_hotel_offer_details`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotelOfferRequest {
    /// Offer id returned by a hotel offers search
    pub offer_id: String,
}

/// Tools that take no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoArguments {}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    fn of<T: JsonSchema>(name: &'static str, description: &'static str) -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name,
            description,
            input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"})),
        }
    }
}

/// All tools with their argument schemas
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::of::<FlightSearch>(
            "get_flight_offers",
            "Search flight offers between two airports on a given date",
        ),
        ToolDefinition::of::<CheapestDatesSearch>(
            "get_cheapest_flights",
            "Find the cheapest travel dates between two cities",
        ),
        ToolDefinition::of::<HotelSearch>(
            "get_hotel_offers",
            "List hotels in a city, optionally filtered by chain, amenities and rating",
        ),
        ToolDefinition::of::<HotelOfferRequest>(
            "get_hotel_offer_details",
            "Get the details of one hotel offer",
        ),
        ToolDefinition::of::<WeatherRequest>(
            "get_weather",
            "Weather forecast for a location, or the prediction for a specific date",
        ),
        ToolDefinition::of::<CurrentWeatherRequest>(
            "get_current_weather",
            "Current weather conditions for a location",
        ),
        ToolDefinition::of::<TravelPlanRequest>(
            "evaluate_travel_plan",
            "Collect weather, flights and hotels for a trip so it can be evaluated",
        ),
        ToolDefinition::of::<BookingRequest>(
            "simulate_booking",
            "Simulate booking a flight and/or hotel. No reservation or payment is made",
        ),
        ToolDefinition::of::<NoArguments>(
            "get_current_datetime",
            "Current UTC date and time (YYYY-MM-DDTHH:MM:SSZ)",
        ),
    ]
}

/// Whether a tool answer is the error mapping
pub fn is_error(answer: &Value) -> bool {
    answer
        .as_object()
        .map_or(false, |o| o.len() == 1 && o.contains_key("error"))
}

fn error_answer(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}

fn answer<T: Serialize>(key: &str, context: &str, result: Result<T>) -> Value {
    let value = result
        .map_err(|e| format!("{}: {}", context, e))
        .and_then(|v| serde_json::to_value(v).map_err(|e| format!("{}: {}", context, e)));

    match value {
        Ok(payload) => json!({ key: payload }),
        Err(message) => {
            tracing::warn!("✗ {}", message);
            error_answer(message)
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> std::result::Result<T, Value> {
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| error_answer(format!("Invalid arguments for {}: {}", tool, e)))
}

pub struct TravelTools {
    flights: Arc<FlightService>,
    hotels: Arc<HotelService>,
    weather: Arc<WeatherService>,
    travel_plan: TravelPlanService,
}

impl TravelTools {
    /// Build every service over one transport; flights and hotels share a
    /// single Amadeus client and therefore a single token.
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        let amadeus = Arc::new(AmadeusClient::new(settings, transport.clone()));
        let flights = Arc::new(FlightService::new(amadeus.clone()));
        let hotels = Arc::new(HotelService::new(amadeus));
        let weather = Arc::new(WeatherService::new(WeatherApiClient::new(settings, transport)));
        let travel_plan = TravelPlanService::new(weather.clone(), flights.clone(), hotels.clone());

        Self {
            flights,
            hotels,
            weather,
            travel_plan,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings, Arc::new(ReqwestTransport::new()))
    }

    pub async fn get_flight_offers(&self, search: &FlightSearch) -> Value {
        answer(
            "flight_offers",
            "Failed to get flight offers",
            self.flights.search_flights(search).await,
        )
    }

    pub async fn get_cheapest_flights(&self, search: &CheapestDatesSearch) -> Value {
        answer(
            "cheapest_dates",
            "Failed to get cheapest flight dates",
            self.flights.cheapest_dates(search).await,
        )
    }

    pub async fn get_hotel_offers(&self, search: &HotelSearch) -> Value {
        answer(
            "hotels",
            "Failed to get hotel offers",
            self.hotels.search_hotels(search).await,
        )
    }

    pub async fn get_hotel_offer_details(&self, request: &HotelOfferRequest) -> Value {
        answer(
            "hotel_offer",
            "Failed to get hotel offer details",
            self.hotels.hotel_offer_details(&request.offer_id).await,
        )
    }

    pub async fn get_weather(&self, request: &WeatherRequest) -> Value {
        answer(
            "weather",
            "Failed to get weather",
            self.weather.weather(request).await,
        )
    }

    pub async fn get_current_weather(&self, request: &CurrentWeatherRequest) -> Value {
        answer(
            "current_weather",
            "Failed to get current weather",
            self.weather.current(&request.location).await,
        )
    }

    pub async fn evaluate_travel_plan(&self, request: &TravelPlanRequest) -> Value {
        answer(
            "travel_plan",
            "Failed to collect travel plan data",
            self.travel_plan.collect(request).await,
        )
    }

    pub fn simulate_booking(&self, request: &BookingRequest) -> Value {
        answer(
            "booking",
            "Failed to simulate booking",
            simulate_booking(request, Utc::now()),
        )
    }

    pub fn get_current_datetime(&self) -> Value {
        json!({ "datetime": current_timestamp() })
    }

    /// Decode `arguments` for the named tool and run it
    pub async fn call(&self, name: &str, arguments: Value) -> Value {
        tracing::info!("→ Tool call: {}", name);

        let result = match name {
            "get_flight_offers" => match decode(name, arguments) {
                Ok(args) => self.get_flight_offers(&args).await,
                Err(e) => e,
            },
            "get_cheapest_flights" => match decode(name, arguments) {
                Ok(args) => self.get_cheapest_flights(&args).await,
                Err(e) => e,
            },
            "get_hotel_offers" => match decode(name, arguments) {
                Ok(args) => self.get_hotel_offers(&args).await,
                Err(e) => e,
            },
            "get_hotel_offer_details" => match decode(name, arguments) {
                Ok(args) => self.get_hotel_offer_details(&args).await,
                Err(e) => e,
            },
            "get_weather" => match decode(name, arguments) {
                Ok(args) => self.get_weather(&args).await,
                Err(e) => e,
            },
            "get_current_weather" => match decode(name, arguments) {
                Ok(args) => self.get_current_weather(&args).await,
                Err(e) => e,
            },
            "evaluate_travel_plan" => match decode(name, arguments) {
                Ok(args) => self.evaluate_travel_plan(&args).await,
                Err(e) => e,
            },
            "simulate_booking" => match decode(name, arguments) {
                Ok(args) => self.simulate_booking(&args),
                Err(e) => e,
            },
            "get_current_datetime" => self.get_current_datetime(),
            _ => error_answer(format!("Unknown tool: {}", name)),
        };

        if is_error(&result) {
            tracing::warn!("✗ Tool {} failed", name);
        } else {
            tracing::info!("✓ Tool {} done", name);
        }
        result
    }

    pub fn has_tool(name: &str) -> bool {
        definitions().iter().any(|d| d.name == name)
    }
}
