/// Resource services
///
/// Each operation validates its arguments before any network call, builds
/// the provider parameters, issues one request and reshapes the raw JSON
/// into a stable schema where absent fields stay present as `null`.

pub mod flight;
pub mod hotel;
pub mod travel_plan;
pub mod weather;

pub use flight::{CheapestDatesSearch, FlightSearch, FlightService};
pub use hotel::{HotelSearch, HotelService};
pub use travel_plan::{TravelPlanRequest, TravelPlanService};
pub use weather::{WeatherRequest, WeatherService};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{ProviderCode, Result, TravelError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate an IATA airport/city code and return it upper-cased
pub(crate) fn iata_code(field: &'static str, code: &str) -> Result<String> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TravelError::validation(
            field,
            format!("'{}' must be a 3-letter IATA code", code),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

pub(crate) fn parse_date(field: &'static str, date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| {
        TravelError::validation(field, format!("'{}' is not a YYYY-MM-DD date", date))
    })
}

/// Translate Amadeus failures with a known provider code into domain errors
pub(crate) fn classify_amadeus_error(err: TravelError) -> TravelError {
    match err.provider_code() {
        Some(ProviderCode::InvalidFormat) => TravelError::InvalidParameterFormat {
            detail: err.provider_detail(),
        },
        Some(ProviderCode::MandatoryDataMissing) => TravelError::MissingRequiredParameters {
            detail: err.provider_detail(),
        },
        Some(ProviderCode::NoLocationFound) | Some(ProviderCode::Other(_)) | None => err,
    }
}

// Accessors over raw provider JSON. A missing or mistyped field is `None`.

pub(crate) fn text(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn number(value: &Value, pointer: &str) -> Option<f64> {
    value.pointer(pointer).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

pub(crate) fn integer(value: &Value, pointer: &str) -> Option<i64> {
    value.pointer(pointer).and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

pub(crate) fn strings(value: &Value, pointer: &str) -> Vec<String> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn items<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}
