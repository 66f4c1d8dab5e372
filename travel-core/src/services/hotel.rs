/// Hotel search against the Amadeus hotel list and hotel offer APIs

use std::sync::Arc;

use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{classify_amadeus_error, iata_code, integer, items, number, strings, text};
use crate::client::AmadeusClient;
use crate::error::{Result, TravelError};
use crate::http::Params;

pub const HOTELS_BY_CITY_ENDPOINT: &str = "/v1/reference-data/locations/hotels/by-city";
pub const HOTEL_OFFERS_ENDPOINT: &str = "/v3/shopping/hotel-offers";

const VALID_RATINGS: [&str; 5] = ["1", "2", "3", "4", "5"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RadiusUnit {
    #[default]
    #[serde(rename = "KM", alias = "km")]
    Km,
    #[serde(rename = "MILE", alias = "mile")]
    Mile,
}

impl RadiusUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadiusUnit::Km => "KM",
            RadiusUnit::Mile => "MILE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum HotelSource {
    #[serde(rename = "BEDBANK", alias = "bedbank")]
    Bedbank,
    #[serde(rename = "DIRECTCHAIN", alias = "directchain")]
    DirectChain,
    #[default]
    #[serde(rename = "ALL", alias = "all")]
    All,
}

impl HotelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HotelSource::Bedbank => "BEDBANK",
            HotelSource::DirectChain => "DIRECTCHAIN",
            HotelSource::All => "ALL",
        }
    }
}

/// Amenity filters accepted by the hotel list API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HotelAmenity {
    SwimmingPool,
    Spa,
    FitnessCenter,
    AirConditioning,
    Restaurant,
    Parking,
    PetsAllowed,
    AirportShuttle,
    BusinessCenter,
    DisabledFacilities,
    Wifi,
    MeetingRooms,
    NoKidAllowed,
    Tennis,
    Golf,
    Kitchen,
    AnimalWatching,
    #[serde(rename = "BABY-SITTING")]
    BabySitting,
    Beach,
    Casino,
    Jacuzzi,
    Sauna,
    Solarium,
    Massage,
    ValetParking,
    #[serde(rename = "BAR or LOUNGE")]
    BarOrLounge,
    KidsWelcome,
    NoPornFilms,
    Minibar,
    Television,
    #[serde(rename = "WI-FI_IN_ROOM")]
    WifiInRoom,
    RoomService,
    #[serde(rename = "GUARDED_PARKG")]
    GuardedParking,
    #[serde(rename = "SERV_SPEC_MENU")]
    SpecialMenu,
}

impl HotelAmenity {
    pub const ALL: [HotelAmenity; 34] = [
        HotelAmenity::SwimmingPool,
        HotelAmenity::Spa,
        HotelAmenity::FitnessCenter,
        HotelAmenity::AirConditioning,
        HotelAmenity::Restaurant,
        HotelAmenity::Parking,
        HotelAmenity::PetsAllowed,
        HotelAmenity::AirportShuttle,
        HotelAmenity::BusinessCenter,
        HotelAmenity::DisabledFacilities,
        HotelAmenity::Wifi,
        HotelAmenity::MeetingRooms,
        HotelAmenity::NoKidAllowed,
        HotelAmenity::Tennis,
        HotelAmenity::Golf,
        HotelAmenity::Kitchen,
        HotelAmenity::AnimalWatching,
        HotelAmenity::BabySitting,
        HotelAmenity::Beach,
        HotelAmenity::Casino,
        HotelAmenity::Jacuzzi,
        HotelAmenity::Sauna,
        HotelAmenity::Solarium,
        HotelAmenity::Massage,
        HotelAmenity::ValetParking,
        HotelAmenity::BarOrLounge,
        HotelAmenity::KidsWelcome,
        HotelAmenity::NoPornFilms,
        HotelAmenity::Minibar,
        HotelAmenity::Television,
        HotelAmenity::WifiInRoom,
        HotelAmenity::RoomService,
        HotelAmenity::GuardedParking,
        HotelAmenity::SpecialMenu,
    ];

    /// Value sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            HotelAmenity::SwimmingPool => "SWIMMING_POOL",
            HotelAmenity::Spa => "SPA",
            HotelAmenity::FitnessCenter => "FITNESS_CENTER",
            HotelAmenity::AirConditioning => "AIR_CONDITIONING",
            HotelAmenity::Restaurant => "RESTAURANT",
            HotelAmenity::Parking => "PARKING",
            HotelAmenity::PetsAllowed => "PETS_ALLOWED",
            HotelAmenity::AirportShuttle => "AIRPORT_SHUTTLE",
            HotelAmenity::BusinessCenter => "BUSINESS_CENTER",
            HotelAmenity::DisabledFacilities => "DISABLED_FACILITIES",
            HotelAmenity::Wifi => "WIFI",
            HotelAmenity::MeetingRooms => "MEETING_ROOMS",
            HotelAmenity::NoKidAllowed => "NO_KID_ALLOWED",
            HotelAmenity::Tennis => "TENNIS",
            HotelAmenity::Golf => "GOLF",
            HotelAmenity::Kitchen => "KITCHEN",
            HotelAmenity::AnimalWatching => "ANIMAL_WATCHING",
            HotelAmenity::BabySitting => "BABY-SITTING",
            HotelAmenity::Beach => "BEACH",
            HotelAmenity::Casino => "CASINO",
            HotelAmenity::Jacuzzi => "JACUZZI",
            HotelAmenity::Sauna => "SAUNA",
            HotelAmenity::Solarium => "SOLARIUM",
            HotelAmenity::Massage => "MASSAGE",
            HotelAmenity::ValetParking => "VALET_PARKING",
            HotelAmenity::BarOrLounge => "BAR or LOUNGE",
            HotelAmenity::KidsWelcome => "KIDS_WELCOME",
            HotelAmenity::NoPornFilms => "NO_PORN_FILMS",
            HotelAmenity::Minibar => "MINIBAR",
            HotelAmenity::Television => "TELEVISION",
            HotelAmenity::WifiInRoom => "WI-FI_IN_ROOM",
            HotelAmenity::RoomService => "ROOM_SERVICE",
            HotelAmenity::GuardedParking => "GUARDED_PARKG",
            HotelAmenity::SpecialMenu => "SERV_SPEC_MENU",
        }
    }
}

/// Hotel search in a city
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotelSearch {
    /// IATA city or airport code (e.g. PAR)
    pub city_code: String,
    /// Maximum distance from the city center (default 50)
    #[serde(default = "default_radius")]
    pub radius: i64,
    /// KM or MILE (default KM)
    #[serde(default)]
    pub radius_unit: RadiusUnit,
    /// 2-letter hotel chain codes
    #[serde(default)]
    pub chain_codes: Option<Vec<String>>,
    #[serde(default)]
    pub amenities: Option<Vec<HotelAmenity>>,
    /// Star ratings, "1" to "5"
    #[serde(default)]
    pub ratings: Option<Vec<String>>,
    /// BEDBANK, DIRECTCHAIN or ALL (default ALL)
    #[serde(default)]
    pub hotel_source: HotelSource,
}

fn default_radius() -> i64 {
    50
}

impl HotelSearch {
    pub fn in_city(city_code: impl Into<String>) -> Self {
        Self {
            city_code: city_code.into(),
            radius: default_radius(),
            radius_unit: RadiusUnit::default(),
            chain_codes: None,
            amenities: None,
            ratings: None,
            hotel_source: HotelSource::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotel {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub iata_code: Option<String>,
    pub distance: Distance,
    pub address: HotelAddress,
    pub geo_code: GeoCode,
    pub chain_code: Option<String>,
    pub amenities: Vec<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distance {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelAddress {
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    pub state_code: Option<String>,
    pub postal_code: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCode {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelOfferDetails {
    pub offer_id: Option<String>,
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub rating: Option<i64>,
    pub description: Option<String>,
    pub address: HotelAddress,
    pub contact: Option<Value>,
    pub amenities: Vec<String>,
    pub price: OfferPrice,
    pub policies: Option<Value>,
    pub room: Room,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferPrice {
    pub total: Option<String>,
    pub currency: Option<String>,
    /// Nightly price breakdown as returned by Amadeus
    pub variations: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub description: Option<String>,
}

pub struct HotelService {
    client: Arc<AmadeusClient>,
}

impl HotelService {
    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub async fn search_hotels(&self, search: &HotelSearch) -> Result<Vec<Hotel>> {
        let params = hotel_search_params(search).map_err(|e| {
            tracing::error!("✗ Rejected hotel search: {}", e);
            e
        })?;
        tracing::info!(
            "→ Searching hotels in {} within {} {}",
            search.city_code,
            search.radius,
            search.radius_unit.as_str()
        );
        tracing::debug!("Hotel search parameters: {:?}", params);

        let response = self
            .client
            .authenticated_request(Method::GET, HOTELS_BY_CITY_ENDPOINT, params, None)
            .await
            .map_err(|e| {
                tracing::error!("✗ Failed to search hotels: {}", e);
                classify_amadeus_error(e)
            })?;

        let hotels = normalize_hotels(&response);
        tracing::info!("✓ Found {} hotels", hotels.len());
        Ok(hotels)
    }

    pub async fn hotel_offer_details(&self, offer_id: &str) -> Result<Option<HotelOfferDetails>> {
        let offer_id = offer_id.trim();
        if offer_id.is_empty() || !offer_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TravelError::validation(
                "offer_id",
                format!("'{}' is not an alphanumeric offer id", offer_id),
            ));
        }
        tracing::info!("→ Getting details for hotel offer {}", offer_id);

        let endpoint = format!("{}/{}", HOTEL_OFFERS_ENDPOINT, offer_id);
        let response = self
            .client
            .authenticated_request(Method::GET, &endpoint, Vec::new(), None)
            .await
            .map_err(classify_amadeus_error)?;

        let details = normalize_hotel_offer(&response);
        if details.is_none() {
            tracing::warn!("No data in hotel offer {} response", offer_id);
        }
        Ok(details)
    }
}

fn hotel_search_params(search: &HotelSearch) -> Result<Params> {
    let city_code = iata_code("city_code", &search.city_code)?;

    if search.radius <= 0 {
        return Err(TravelError::validation("radius", "must be positive"));
    }

    let mut params = vec![
        ("cityCode".to_string(), city_code),
        ("radius".to_string(), search.radius.to_string()),
        ("radiusUnit".to_string(), search.radius_unit.as_str().to_string()),
        ("hotelSource".to_string(), search.hotel_source.as_str().to_string()),
    ];

    if let Some(chain_codes) = search.chain_codes.as_ref().filter(|c| !c.is_empty()) {
        if let Some(bad) = chain_codes
            .iter()
            .find(|c| c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_alphabetic()))
        {
            return Err(TravelError::validation(
                "chain_codes",
                format!("'{}' is not a 2-letter chain code", bad),
            ));
        }
        let codes = chain_codes
            .iter()
            .map(|c| c.to_ascii_uppercase())
            .collect::<Vec<_>>();
        params.push(("chainCodes".to_string(), codes.join(",")));
    }

    if let Some(amenities) = search.amenities.as_ref().filter(|a| !a.is_empty()) {
        let values = amenities.iter().map(|a| a.as_str()).collect::<Vec<_>>();
        params.push(("amenities".to_string(), values.join(",")));
    }

    if let Some(ratings) = search.ratings.as_ref().filter(|r| !r.is_empty()) {
        let invalid = ratings
            .iter()
            .filter(|r| !VALID_RATINGS.contains(&r.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if !invalid.is_empty() {
            return Err(TravelError::validation(
                "ratings",
                format!("{:?} must be between 1 and 5", invalid),
            ));
        }
        params.push(("ratings".to_string(), ratings.join(",")));
    }

    Ok(params)
}

fn address(value: &Value, prefix: &str) -> HotelAddress {
    HotelAddress {
        city_name: text(value, &format!("{}/address/cityName", prefix)),
        country_code: text(value, &format!("{}/address/countryCode", prefix)),
        state_code: text(value, &format!("{}/address/stateCode", prefix)),
        postal_code: text(value, &format!("{}/address/postalCode", prefix)),
        lines: strings(value, &format!("{}/address/lines", prefix)),
    }
}

pub fn normalize_hotels(response: &Value) -> Vec<Hotel> {
    items(response, "/data")
        .iter()
        .map(|hotel| Hotel {
            hotel_id: text(hotel, "/hotelId"),
            name: text(hotel, "/name"),
            iata_code: text(hotel, "/iataCode"),
            distance: Distance {
                value: number(hotel, "/distance/value"),
                unit: text(hotel, "/distance/unit"),
            },
            address: address(hotel, ""),
            geo_code: GeoCode {
                latitude: number(hotel, "/geoCode/latitude"),
                longitude: number(hotel, "/geoCode/longitude"),
            },
            chain_code: text(hotel, "/chainCode"),
            amenities: strings(hotel, "/amenities"),
            rating: integer(hotel, "/rating"),
        })
        .collect()
}

/// Reshape a hotel offer response; `None` when the response has no data.
///
/// The offer fields come from `data.offers[0]` when present, otherwise
/// from `data` itself.
pub fn normalize_hotel_offer(response: &Value) -> Option<HotelOfferDetails> {
    let data = response.get("data").filter(|d| d.is_object())?;
    let offer = data
        .pointer("/offers/0")
        .filter(|o| o.is_object())
        .unwrap_or(data);

    Some(HotelOfferDetails {
        offer_id: text(offer, "/id"),
        hotel_id: text(data, "/hotel/hotelId"),
        name: text(data, "/hotel/name"),
        rating: integer(data, "/hotel/rating"),
        description: text(data, "/hotel/description/text"),
        address: address(data, "/hotel"),
        contact: data.pointer("/hotel/contact").cloned(),
        amenities: strings(data, "/hotel/amenities"),
        price: OfferPrice {
            total: text(offer, "/price/total"),
            currency: text(offer, "/price/currency"),
            variations: offer.pointer("/price/variations").cloned(),
        },
        policies: offer.get("policies").cloned(),
        room: Room {
            room_type: text(offer, "/room/type"),
            description: text(offer, "/room/description/text")
                .or_else(|| text(offer, "/room/description")),
        },
        available: data.get("available").and_then(|a| a.as_bool()).unwrap_or(true),
    })
}
