//! Travel Core Library
//!
//! Travel tool functions backed by the Amadeus and WeatherAPI REST APIs:
//! - flight offers and cheapest travel dates
//! - hotels by city and hotel offer details
//! - weather forecast, future and current conditions
//! - travel plan data collection, simulated booking, current time

pub mod booking;
pub mod client;
pub mod config;
pub mod datetime;
pub mod error;
pub mod http;
pub mod services;
pub mod tools;

pub use config::Settings;
pub use error::{ProviderCode, ProviderError, Result, TravelError};
pub use http::{ReqwestTransport, Transport};
pub use tools::{definitions, is_error, ToolDefinition, TravelTools};
