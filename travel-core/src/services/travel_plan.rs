/// Travel plan collection
///
/// Gathers weather, flights and hotels for a trip in one call so the caller
/// can evaluate the plan as a whole. No scoring happens here.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::flight::{FlightOffer, MAX_ADULTS};
use super::hotel::Hotel;
use super::weather::{ForecastDay, Location, WeatherReport};
use super::{iata_code, parse_date, FlightSearch, FlightService, HotelSearch, HotelService, WeatherService};
use crate::error::{Result, TravelError};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TravelPlanRequest {
    /// Origin airport IATA code
    pub origin: String,
    /// Destination airport or city IATA code
    pub destination: String,
    /// Trip start date (YYYY-MM-DD)
    pub start_date: String,
    /// Trip end date (YYYY-MM-DD)
    pub end_date: String,
    /// Maximum budget for the whole trip
    pub max_budget: f64,
    /// Number of adult travelers (default 1)
    #[serde(default = "default_adults")]
    pub adults: u32,
}

fn default_adults() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelPlan {
    pub trip_details: TripDetails,
    pub weather: PlanWeather,
    pub flights: Vec<FlightOffer>,
    pub hotels: Vec<Hotel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDetails {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: i64,
    pub travelers: u32,
    pub max_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanWeather {
    pub location: Location,
    pub daily_forecast: Vec<ForecastDay>,
}

impl From<WeatherReport> for PlanWeather {
    fn from(report: WeatherReport) -> Self {
        Self {
            location: report.location,
            daily_forecast: report.forecast,
        }
    }
}

pub struct TravelPlanService {
    weather: Arc<WeatherService>,
    flights: Arc<FlightService>,
    hotels: Arc<HotelService>,
}

impl TravelPlanService {
    pub fn new(
        weather: Arc<WeatherService>,
        flights: Arc<FlightService>,
        hotels: Arc<HotelService>,
    ) -> Self {
        Self {
            weather,
            flights,
            hotels,
        }
    }

    pub async fn collect(&self, request: &TravelPlanRequest) -> Result<TravelPlan> {
        let origin = iata_code("origin", &request.origin)?;
        let destination = iata_code("destination", &request.destination)?;
        let start = parse_date("start_date", &request.start_date)?;
        let end = parse_date("end_date", &request.end_date)?;
        if end < start {
            return Err(TravelError::validation(
                "end_date",
                "must not be before start_date",
            ));
        }
        if !(request.max_budget.is_finite() && request.max_budget > 0.0) {
            return Err(TravelError::validation("max_budget", "must be positive"));
        }
        if !(1..=MAX_ADULTS).contains(&request.adults) {
            return Err(TravelError::validation(
                "adults",
                format!("must be between 1 and {}", MAX_ADULTS),
            ));
        }

        let duration_days = (end - start).num_days();
        tracing::info!(
            "→ Collecting travel plan {} → {} ({} days, {} travelers)",
            origin,
            destination,
            duration_days,
            request.adults
        );

        // WeatherAPI resolves airport codes given as iata:<code>
        let weather = self
            .weather
            .forecast(&format!("iata:{}", destination), duration_days + 1)
            .await?;

        let flights = self
            .flights
            .search_flights(&FlightSearch {
                origin: origin.clone(),
                destination: destination.clone(),
                date: request.start_date.trim().to_string(),
                adults: request.adults,
            })
            .await?;

        let hotels = self
            .hotels
            .search_hotels(&HotelSearch::in_city(destination.clone()))
            .await?;

        tracing::info!(
            "✓ Travel plan collected: {} forecast days, {} flights, {} hotels",
            weather.forecast.len(),
            flights.len(),
            hotels.len()
        );

        Ok(TravelPlan {
            trip_details: TripDetails {
                origin,
                destination,
                start_date: request.start_date.trim().to_string(),
                end_date: request.end_date.trim().to_string(),
                duration_days,
                travelers: request.adults,
                max_budget: request.max_budget,
            },
            weather: weather.into(),
            flights,
            hotels,
        })
    }
}
