/// Simulated booking
///
/// Nothing is reserved and nothing is charged. Prices are flat rates so a
/// booking is fully determined by its request and the time it was made.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TravelError};

pub const FLIGHT_PRICE: f64 = 500.00;
pub const HOTEL_PRICE_PER_NIGHT: f64 = 200.00;
pub const CURRENCY: &str = "USD";
pub const SIMULATION_NOTE: &str =
    "(This is a simulated booking - no actual reservations or charges were made)";

const HOTEL_NIGHTS: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookingRequest {
    /// Flight offer id to book
    #[serde(default)]
    pub flight_id: Option<String>,
    /// Hotel id to book
    #[serde(default)]
    pub hotel_id: Option<String>,
    /// Number of guests (default 1)
    #[serde(default = "default_guests")]
    pub guests: u32,
    /// Payment method label (default credit_card)
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_guests() -> u32 {
    1
}

fn default_payment_method() -> String {
    "credit_card".to_string()
}

impl Default for BookingRequest {
    fn default() -> Self {
        Self {
            flight_id: None,
            hotel_id: None,
            guests: default_guests(),
            payment_method: default_payment_method(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookingItem {
    Flight {
        id: String,
        price: f64,
        guests: u32,
    },
    Hotel {
        id: String,
        price_per_night: f64,
        nights: u32,
        guests: u32,
    },
}

impl BookingItem {
    pub fn total(&self) -> f64 {
        match self {
            BookingItem::Flight { price, guests, .. } => price * f64::from(*guests),
            BookingItem::Hotel {
                price_per_night,
                nights,
                guests,
                ..
            } => price_per_night * f64::from(*nights) * f64::from(*guests),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub method: String,
    pub status: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub booking_reference: String,
    pub status: String,
    pub items: Vec<BookingItem>,
    pub total_price: f64,
    pub currency: String,
    pub guests: u32,
    pub payment: Payment,
    pub note: String,
}

/// Simulate a booking made at `now`.
///
/// A request naming neither a flight nor a hotel still yields a confirmed
/// booking with no items and a zero total.
pub fn simulate_booking(request: &BookingRequest, now: DateTime<Utc>) -> Result<Booking> {
    if request.guests < 1 {
        return Err(TravelError::validation("guests", "must be at least 1"));
    }
    let guests = request.guests;

    let mut items = Vec::new();
    if let Some(id) = request.flight_id.as_deref().filter(|id| !id.is_empty()) {
        items.push(BookingItem::Flight {
            id: id.to_string(),
            price: FLIGHT_PRICE,
            guests,
        });
    }
    if let Some(id) = request.hotel_id.as_deref().filter(|id| !id.is_empty()) {
        items.push(BookingItem::Hotel {
            id: id.to_string(),
            price_per_night: HOTEL_PRICE_PER_NIGHT,
            nights: HOTEL_NIGHTS,
            guests,
        });
    }

    let total_price = items.iter().map(BookingItem::total).sum::<f64>();
    let booking_reference = format!("BK{}", now.format("%Y%m%d%H%M%S"));

    tracing::info!(
        "✓ Simulated booking {} with {} items, total {:.2} {}",
        booking_reference,
        items.len(),
        total_price,
        CURRENCY
    );

    Ok(Booking {
        booking_reference,
        status: "confirmed".to_string(),
        items,
        total_price,
        currency: CURRENCY.to_string(),
        guests,
        payment: Payment {
            method: request.payment_method.clone(),
            status: "simulated".to_string(),
            amount: total_price,
        },
        note: SIMULATION_NOTE.to_string(),
    })
}
