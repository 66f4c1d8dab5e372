/// Flight search against the Amadeus shopping APIs

use std::sync::Arc;

use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{classify_amadeus_error, iata_code, integer, items, parse_date, text};
use crate::client::AmadeusClient;
use crate::error::{Result, TravelError};
use crate::http::Params;

pub const FLIGHT_OFFERS_ENDPOINT: &str = "/v2/shopping/flight-offers";
pub const FLIGHT_DATES_ENDPOINT: &str = "/v1/shopping/flight-dates";

pub(crate) const MAX_ADULTS: u32 = 9;

/// Flight offer search for a specific date
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FlightSearch {
    /// Origin airport IATA code (e.g. JFK)
    pub origin: String,
    /// Destination airport IATA code (e.g. LHR)
    pub destination: String,
    /// Departure date in YYYY-MM-DD format
    pub date: String,
    /// Number of adult passengers (default 1)
    #[serde(default = "default_adults")]
    pub adults: u32,
}

fn default_adults() -> u32 {
    1
}

/// Cheapest travel dates search for flexible trips
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CheapestDatesSearch {
    /// Origin IATA code
    pub origin: String,
    /// Destination IATA code
    pub destination: String,
    /// Departure date (YYYY-MM-DD) or range (YYYY-MM-DD,YYYY-MM-DD)
    #[serde(default)]
    pub departure_date: Option<String>,
    /// Only one-way trips
    #[serde(default)]
    pub one_way: bool,
    /// Trip length in days, exact (7) or range (5,10); round trips only
    #[serde(default)]
    pub duration: Option<String>,
    /// Only direct flights
    #[serde(default)]
    pub non_stop: bool,
    /// Maximum price per traveler
    #[serde(default)]
    pub max_price: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOffer {
    pub id: Option<String>,
    pub price: Price,
    pub seats_available: Option<i64>,
    pub last_ticketing_date: Option<String>,
    pub segments: Vec<FlightSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Price {
    pub total: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSegment {
    pub departure: SegmentPoint,
    pub arrival: SegmentPoint,
    pub carrier: CodeName,
    pub flight_number: Option<String>,
    pub aircraft: CodeName,
    pub duration: Option<String>,
    pub stops: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPoint {
    pub airport: Option<String>,
    pub terminal: Option<String>,
    pub time: Option<String>,
}

/// A provider code with its human-readable name from the response dictionaries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeName {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestDate {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub price: Price,
}

pub struct FlightService {
    client: Arc<AmadeusClient>,
}

impl FlightService {
    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<FlightOffer>> {
        let params = flight_offer_params(search)?;
        tracing::info!(
            "→ Searching flights from {} to {} on {}",
            search.origin,
            search.destination,
            search.date
        );

        let response = self
            .client
            .authenticated_request(Method::GET, FLIGHT_OFFERS_ENDPOINT, params, None)
            .await
            .map_err(|e| {
                tracing::error!("✗ Failed to search flights: {}", e);
                classify_amadeus_error(e)
            })?;

        let offers = normalize_flight_offers(&response);
        tracing::info!("✓ Found {} flight offers", offers.len());
        Ok(offers)
    }

    pub async fn cheapest_dates(&self, search: &CheapestDatesSearch) -> Result<Vec<CheapestDate>> {
        let params = cheapest_dates_params(search)?;
        tracing::info!(
            "→ Searching cheapest dates from {} to {}",
            search.origin,
            search.destination
        );

        let response = self
            .client
            .authenticated_request(Method::GET, FLIGHT_DATES_ENDPOINT, params, None)
            .await
            .map_err(classify_amadeus_error)?;

        let dates = normalize_cheapest_dates(&response);
        tracing::info!("✓ Found {} candidate dates", dates.len());
        Ok(dates)
    }
}

fn flight_offer_params(search: &FlightSearch) -> Result<Params> {
    let origin = iata_code("origin", &search.origin)?;
    let destination = iata_code("destination", &search.destination)?;
    let date = parse_date("date", &search.date)?;
    if !(1..=MAX_ADULTS).contains(&search.adults) {
        return Err(TravelError::validation(
            "adults",
            format!("must be between 1 and {}", MAX_ADULTS),
        ));
    }

    Ok(vec![
        ("originLocationCode".to_string(), origin),
        ("destinationLocationCode".to_string(), destination),
        ("departureDate".to_string(), date.format(super::DATE_FORMAT).to_string()),
        ("adults".to_string(), search.adults.to_string()),
    ])
}

fn cheapest_dates_params(search: &CheapestDatesSearch) -> Result<Params> {
    let origin = iata_code("origin", &search.origin)?;
    let destination = iata_code("destination", &search.destination)?;

    let mut params = vec![
        ("origin".to_string(), origin),
        ("destination".to_string(), destination),
    ];

    if let Some(dates) = search.departure_date.as_deref() {
        let parts = dates.split(',').map(str::trim).collect::<Vec<_>>();
        let parsed = parts
            .iter()
            .map(|d| parse_date("departure_date", d))
            .collect::<Result<Vec<_>>>()?;
        match parsed.as_slice() {
            [_] => {}
            [start, end] if start <= end => {}
            [_, _] => {
                return Err(TravelError::validation(
                    "departure_date",
                    "range start must not be after its end",
                ))
            }
            _ => {
                return Err(TravelError::validation(
                    "departure_date",
                    "expected a date or a start,end range",
                ))
            }
        }
        params.push(("departureDate".to_string(), parts.join(",")));
    }

    if let Some(duration) = search.duration.as_deref() {
        if search.one_way {
            return Err(TravelError::validation(
                "duration",
                "cannot be combined with a one-way search",
            ));
        }
        params.push(("duration".to_string(), validate_duration(duration)?));
    }

    params.push(("oneWay".to_string(), search.one_way.to_string()));
    params.push(("nonStop".to_string(), search.non_stop.to_string()));

    if let Some(max_price) = search.max_price {
        if max_price == 0 {
            return Err(TravelError::validation("max_price", "must be positive"));
        }
        params.push(("maxPrice".to_string(), max_price.to_string()));
    }

    Ok(params)
}

fn validate_duration(duration: &str) -> Result<String> {
    let invalid = || TravelError::validation("duration", format!("'{}' is not N or N,M days", duration));

    let days = duration
        .split(',')
        .map(|d| d.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;

    match days.as_slice() {
        [n] if *n >= 1 => Ok(n.to_string()),
        [min, max] if *min >= 1 && min <= max => Ok(format!("{},{}", min, max)),
        _ => Err(invalid()),
    }
}

/// Reshape a raw flight-offers response.
///
/// Segments of every itinerary are flattened into one list, carrier and
/// aircraft names are resolved from `dictionaries`.
pub fn normalize_flight_offers(response: &Value) -> Vec<FlightOffer> {
    let name_of = |dictionary: &str, code: &Option<String>| -> Option<String> {
        code.as_deref()
            .and_then(|c| text(response, &format!("/dictionaries/{}/{}", dictionary, c)))
    };

    items(response, "/data")
        .iter()
        .map(|offer| {
            let segments = items(offer, "/itineraries")
                .iter()
                .flat_map(|itinerary| items(itinerary, "/segments"))
                .map(|segment| {
                    let carrier_code = text(segment, "/carrierCode");
                    let aircraft_code = text(segment, "/aircraft/code");
                    FlightSegment {
                        departure: segment_point(segment, "departure"),
                        arrival: segment_point(segment, "arrival"),
                        carrier: CodeName {
                            name: name_of("carriers", &carrier_code),
                            code: carrier_code,
                        },
                        flight_number: text(segment, "/number"),
                        aircraft: CodeName {
                            name: name_of("aircraft", &aircraft_code),
                            code: aircraft_code,
                        },
                        duration: text(segment, "/duration"),
                        stops: integer(segment, "/numberOfStops").unwrap_or(0),
                    }
                })
                .collect();

            FlightOffer {
                id: text(offer, "/id"),
                price: Price {
                    total: text(offer, "/price/total"),
                    currency: text(offer, "/price/currency"),
                },
                seats_available: integer(offer, "/numberOfBookableSeats"),
                last_ticketing_date: text(offer, "/lastTicketingDate"),
                segments,
            }
        })
        .collect()
}

fn segment_point(segment: &Value, side: &str) -> SegmentPoint {
    SegmentPoint {
        airport: text(segment, &format!("/{}/iataCode", side)),
        terminal: text(segment, &format!("/{}/terminal", side)),
        time: text(segment, &format!("/{}/at", side)),
    }
}

pub fn normalize_cheapest_dates(response: &Value) -> Vec<CheapestDate> {
    let currency = text(response, "/meta/currency");
    items(response, "/data")
        .iter()
        .map(|entry| CheapestDate {
            origin: text(entry, "/origin"),
            destination: text(entry, "/destination"),
            departure_date: text(entry, "/departureDate"),
            return_date: text(entry, "/returnDate"),
            price: Price {
                total: text(entry, "/price/total"),
                currency: currency.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::amadeus::tests::{test_settings, token_response};
    use crate::client::amadeus::TOKEN_ENDPOINT;
    use crate::http::testing::FakeTransport;
    use serde_json::json;

    pub fn raw_offers() -> Value {
        json!({
            "data": [{
                "id": "1",
                "numberOfBookableSeats": 9,
                "lastTicketingDate": "2025-06-01",
                "price": {"currency": "EUR", "total": "355.34"},
                "itineraries": [{
                    "duration": "PT8H5M",
                    "segments": [{
                        "departure": {"iataCode": "JFK", "terminal": "4", "at": "2025-06-10T18:00:00"},
                        "arrival": {"iataCode": "LHR", "terminal": "5", "at": "2025-06-11T06:05:00"},
                        "carrierCode": "BA",
                        "number": "178",
                        "aircraft": {"code": "777"},
                        "duration": "PT7H5M",
                        "numberOfStops": 0
                    }, {
                        "departure": {"iataCode": "LHR", "at": "2025-06-11T08:00:00"},
                        "arrival": {"iataCode": "CDG", "at": "2025-06-11T10:15:00"},
                        "carrierCode": "XX",
                        "number": "42",
                        "aircraft": {"code": "320"}
                    }]
                }]
            }],
            "dictionaries": {
                "carriers": {"BA": "BRITISH AIRWAYS"},
                "aircraft": {"777": "BOEING 777-200/200ER", "320": "AIRBUS A320"}
            }
        })
    }

    fn service(transport: Arc<FakeTransport>) -> FlightService {
        FlightService::new(Arc::new(AmadeusClient::new(&test_settings(), transport)))
    }

    #[test]
    fn test_normalize_flight_offers() {
        let offers = normalize_flight_offers(&raw_offers());
        assert_eq!(offers.len(), 1);

        let offer = &offers[0];
        assert_eq!(offer.id.as_deref(), Some("1"));
        assert_eq!(offer.price.total.as_deref(), Some("355.34"));
        assert_eq!(offer.seats_available, Some(9));
        assert_eq!(offer.segments.len(), 2);

        let first = &offer.segments[0];
        assert_eq!(first.departure.terminal.as_deref(), Some("4"));
        assert_eq!(first.carrier.name.as_deref(), Some("BRITISH AIRWAYS"));
        assert_eq!(first.aircraft.name.as_deref(), Some("BOEING 777-200/200ER"));

        let second = &offer.segments[1];
        assert_eq!(second.departure.terminal, None);
        assert_eq!(second.carrier.code.as_deref(), Some("XX"));
        assert_eq!(second.carrier.name, None);
        assert_eq!(second.stops, 0);
    }

    #[test]
    fn test_normalizing_twice_yields_same_offers() {
        let raw = raw_offers();
        assert_eq!(normalize_flight_offers(&raw), normalize_flight_offers(&raw));
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let offers = normalize_flight_offers(&json!({"data": [{"id": "7"}]}));
        let json = serde_json::to_value(&offers[0]).unwrap();
        assert_eq!(json["seats_available"], Value::Null);
        assert_eq!(json["price"]["total"], Value::Null);
        assert!(json.as_object().unwrap().contains_key("last_ticketing_date"));
        assert_eq!(json["segments"], json!([]));
    }

    #[tokio::test]
    async fn test_search_sends_upper_cased_params() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(token_response()).push_ok(raw_offers());

        let offers = service(transport.clone())
            .search_flights(&FlightSearch {
                origin: "jfk".into(),
                destination: "lhr".into(),
                date: "2025-06-10".into(),
                adults: 2,
            })
            .await
            .unwrap();

        assert_eq!(offers.len(), 1);
        let request = transport.requests().pop().unwrap();
        assert!(request.url.ends_with(FLIGHT_OFFERS_ENDPOINT));
        assert_eq!(request.param("originLocationCode"), Some("JFK"));
        assert_eq!(request.param("destinationLocationCode"), Some("LHR"));
        assert_eq!(request.param("adults"), Some("2"));
    }

    #[tokio::test]
    async fn test_invalid_search_makes_no_request() {
        let transport = Arc::new(FakeTransport::new());
        let service = service(transport.clone());

        let cases = [
            ("JFKX", "LHR", "2025-06-10", 1, "origin"),
            ("JFK", "L1R", "2025-06-10", 1, "destination"),
            ("JFK", "LHR", "10-06-2025", 1, "date"),
            ("JFK", "LHR", "2025-06-10", 0, "adults"),
            ("JFK", "LHR", "2025-06-10", 10, "adults"),
        ];
        for (origin, destination, date, adults, expected) in cases {
            let err = service
                .search_flights(&FlightSearch {
                    origin: origin.into(),
                    destination: destination.into(),
                    date: date.into(),
                    adults,
                })
                .await
                .unwrap_err();
            match err {
                TravelError::Validation { field, .. } => assert_eq!(field, expected),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_duration_rejected_for_one_way() {
        let err = cheapest_dates_params(&CheapestDatesSearch {
            origin: "MAD".into(),
            destination: "MUC".into(),
            one_way: true,
            duration: Some("7".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TravelError::Validation { field: "duration", .. }));
    }

    #[test]
    fn test_cheapest_dates_params() {
        let params = cheapest_dates_params(&CheapestDatesSearch {
            origin: "mad".into(),
            destination: "muc".into(),
            departure_date: Some("2025-07-01, 2025-07-10".into()),
            duration: Some("5,10".into()),
            max_price: Some(400),
            ..Default::default()
        })
        .unwrap();

        let get = |k: &str| params.iter().find(|(p, _)| p == k).map(|(_, v)| v.as_str());
        assert_eq!(get("origin"), Some("MAD"));
        assert_eq!(get("departureDate"), Some("2025-07-01,2025-07-10"));
        assert_eq!(get("duration"), Some("5,10"));
        assert_eq!(get("oneWay"), Some("false"));
        assert_eq!(get("maxPrice"), Some("400"));
    }

    #[test]
    fn test_bad_cheapest_dates_arguments() {
        let base = CheapestDatesSearch {
            origin: "MAD".into(),
            destination: "MUC".into(),
            ..Default::default()
        };
        let cases = [
            CheapestDatesSearch { departure_date: Some("2025-07-10,2025-07-01".into()), ..base.clone() },
            CheapestDatesSearch { departure_date: Some("2025-07-01,2025-07-02,2025-07-03".into()), ..base.clone() },
            CheapestDatesSearch { duration: Some("10,5".into()), ..base.clone() },
            CheapestDatesSearch { duration: Some("0".into()), ..base.clone() },
            CheapestDatesSearch { duration: Some("a week".into()), ..base.clone() },
            CheapestDatesSearch { max_price: Some(0), ..base.clone() },
        ];
        for case in cases {
            assert!(cheapest_dates_params(&case).is_err(), "{case:?}");
        }
    }

    #[tokio::test]
    async fn test_cheapest_dates_normalized_with_meta_currency() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(token_response()).push_ok(json!({
            "data": [{
                "type": "flight-date",
                "origin": "MAD",
                "destination": "MUC",
                "departureDate": "2025-07-02",
                "returnDate": "2025-07-09",
                "price": {"total": "124.66"}
            }],
            "meta": {"currency": "EUR"}
        }));

        let dates = service(transport.clone())
            .cheapest_dates(&CheapestDatesSearch {
                origin: "MAD".into(),
                destination: "MUC".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].return_date.as_deref(), Some("2025-07-09"));
        assert_eq!(dates[0].price.currency.as_deref(), Some("EUR"));
        assert_eq!(transport.count_to(TOKEN_ENDPOINT), 1);
        assert_eq!(transport.count_to(FLIGHT_DATES_ENDPOINT), 1);
    }
}
