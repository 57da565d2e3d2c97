//! Backend request/response contracts and their mapping onto [`Flight`]
//!
//! Two incompatible API generations are spoken: the V2 explore and multi-city
//! endpoints, and the legacy V1 search endpoint used as a fallback. Neither
//! returns everything a [`Flight`] needs, so the gaps are filled with fixed
//! placeholder values.

use crate::transform::{FlightSearchParams, OriginDestination};
use crate::{Flight, FlightError, TripType};
use crate::params::DateSearchType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

pub const EXPLORE_PATH: &str = "/api/FlightSearch/explore";
pub const MULTI_CITY_PATH: &str = "/api/FlightSearch/multi-city";
pub const V1_SEARCH_PATH: &str = "/api/FlightSearch/search";

/// Offers requested per search
pub const MAX_RESULTS: u32 = 50;
/// Flight time assumed on top of layovers when V2 gives no detail
pub const ESTIMATED_FLIGHT_MINUTES: u32 = 120;

const V2_AIRLINE: &str = "Multiple Airlines";
const V2_DIRECT_ARRIVAL: &str = "10:00";
const V2_DIRECT_DURATION: &str = "2h 00m";

const V1_AIRLINE: &str = "Various Airlines";
const V1_DEPARTURE: &str = "08:00";
const V1_ARRIVAL: &str = "10:30";
const V1_DURATION: &str = "2h 30m";

// ============================================================================
// V2 explore
// ============================================================================

/// Query parameters of `GET /api/FlightSearch/explore`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreRequest {
    pub origin: String,
    pub destination: Option<String>,
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub departure_day_of_week: Option<u32>,
    pub return_day_of_week: Option<u32>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub duration_days: Option<u32>,
    pub min_layover_duration: Option<u32>,
    pub layovers: Option<u32>,
    pub max_price: Option<u32>,
    pub adults: Option<u32>,
    pub max: Option<u32>,
    pub result_limit: Option<u32>,
}

impl ExploreRequest {
    pub fn from_params(params: &FlightSearchParams) -> Self {
        let roundtrip = params.trip_type == TripType::RoundTrip;
        let mut request = Self {
            origin: params.from.clone(),
            destination: Some(params.to.clone()).filter(|d| !d.is_empty()),
            adults: Some(params.travellers),
            max: Some(MAX_RESULTS),
            result_limit: Some(MAX_RESULTS),
            ..Default::default()
        };

        match params.date_search_type {
            DateSearchType::Specific => {
                request.departure_date = params.depart_date.clone();
                if roundtrip {
                    request.return_date = params.return_date.clone();
                }
            }
            DateSearchType::FlexibleMonth => {
                request.year = params.year.filter(|y| *y != 0);
                request.month = params.month.filter(|m| *m != 0);
            }
            DateSearchType::FlexibleDays => {
                request.departure_day_of_week = params.departure_day_of_week;
                if roundtrip {
                    request.return_day_of_week = params.return_day_of_week;
                }
            }
            DateSearchType::Duration => {
                request.duration_days = params.duration_days.filter(|d| *d != 0);
                request.departure_date = params.earliest_departure.clone();
            }
        }

        request.layovers = params.max_stops;
        request.min_layover_duration = params.min_layover_time;
        request.max_price = params.max_price;
        request
    }

    /// Query pairs in backend order; unset fields are left out entirely
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("origin", self.origin.clone())];
        let optional: [(&'static str, Option<String>); 14] = [
            ("destination", self.destination.clone()),
            ("year", self.year.map(|v| v.to_string())),
            ("month", self.month.map(|v| v.to_string())),
            ("departureDayOfWeek", self.departure_day_of_week.map(|v| v.to_string())),
            ("returnDayOfWeek", self.return_day_of_week.map(|v| v.to_string())),
            ("departureDate", self.departure_date.clone()),
            ("returnDate", self.return_date.clone()),
            ("durationDays", self.duration_days.map(|v| v.to_string())),
            ("minLayoverDuration", self.min_layover_duration.map(|v| v.to_string())),
            ("layovers", self.layovers.map(|v| v.to_string())),
            ("maxPrice", self.max_price.map(|v| v.to_string())),
            ("adults", self.adults.map(|v| v.to_string())),
            ("max", self.max.map(|v| v.to_string())),
            ("resultLimit", self.result_limit.map(|v| v.to_string())),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v))),
        );
        pairs
    }
}

/// Price arrives as a decimal string, but tolerate a bare number too
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(f64),
}

impl PriceValue {
    pub fn amount(&self) -> Option<f64> {
        match self {
            PriceValue::Text(text) => text.trim().parse::<f64>().ok(),
            PriceValue::Number(n) => Some(*n),
        }
        .filter(|n| n.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOfferV2 {
    pub origin: String,
    pub destination: String,
    pub price: PriceValue,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub layovers: Vec<LayoverV2>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoverV2 {
    pub airport: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub arrival_time_of_previous_flight: String,
    #[serde(default)]
    pub departure_time_of_next_flight: String,
}

// ============================================================================
// V2 multi-city
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerType {
    Adult = 0,
    Child = 1,
}

impl Serialize for TravelerType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub traveler_type: TravelerType,
    pub fare_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub max_flight_offers: u32,
}

/// Body of `POST /api/FlightSearch/multi-city`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCityRequest {
    pub origin_destinations: Vec<OriginDestination>,
    pub travelers: Vec<Traveler>,
    pub sources: Vec<String>,
    pub search_criteria: SearchCriteria,
}

impl MultiCityRequest {
    pub fn new(legs: Vec<OriginDestination>) -> Self {
        Self {
            origin_destinations: legs,
            travelers: vec![Traveler {
                traveler_type: TravelerType::Adult,
                fare_options: vec!["STANDARD".to_string()],
            }],
            sources: vec!["GDS".to_string()],
            search_criteria: SearchCriteria {
                max_flight_offers: MAX_RESULTS,
            },
        }
    }
}

/// The multi-city endpoint answers with either a bare list or `{ "data": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MultiCityResponse {
    Offers(Vec<FlightOfferV2>),
    Wrapped {
        #[serde(default)]
        data: Vec<FlightOfferV2>,
    },
}

impl MultiCityResponse {
    pub fn into_offers(self) -> Vec<FlightOfferV2> {
        match self {
            MultiCityResponse::Offers(offers) => offers,
            MultiCityResponse::Wrapped { data } => data,
        }
    }
}

// ============================================================================
// V1 search
// ============================================================================

/// Query parameters of `GET /api/FlightSearch/search/{origin}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequestV1 {
    pub max_price: Option<u32>,
    pub one_way: Option<bool>,
    pub departure_date: Option<String>,
    pub duration: Option<u32>,
    pub non_stop: Option<bool>,
}

impl SearchRequestV1 {
    pub fn from_params(params: &FlightSearchParams) -> Self {
        Self {
            max_price: params.max_price,
            one_way: Some(params.trip_type == TripType::OneWay),
            departure_date: params.depart_date.clone(),
            duration: match params.date_search_type {
                DateSearchType::Duration => params.duration_days.filter(|d| *d != 0),
                _ => None,
            },
            non_stop: Some(params.max_stops == Some(0)),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let pairs: [(&'static str, Option<String>); 5] = [
            ("maxPrice", self.max_price.map(|v| v.to_string())),
            ("oneWay", self.one_way.map(|v| v.to_string())),
            ("departureDate", self.departure_date.clone().filter(|d| !d.is_empty())),
            ("duration", self.duration.map(|v| v.to_string())),
            ("nonStop", self.non_stop.map(|v| v.to_string())),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceV1 {
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDestinationV1 {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
    pub price: PriceV1,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponseV1 {
    pub data: Vec<FlightDestinationV1>,
}

// ============================================================================
// Mapping
// ============================================================================

struct LayoverSummary {
    arrival_time: String,
    total_duration: String,
    stops: String,
}

fn summarize_layovers(layovers: &[LayoverV2]) -> LayoverSummary {
    let Some(last) = layovers.last() else {
        return LayoverSummary {
            arrival_time: V2_DIRECT_ARRIVAL.to_string(),
            total_duration: V2_DIRECT_DURATION.to_string(),
            stops: "Direct".to_string(),
        };
    };

    let total_minutes: u32 =
        layovers.iter().map(|l| l.duration_minutes).sum::<u32>() + ESTIMATED_FLIGHT_MINUTES;
    let stops = if layovers.len() == 1 {
        "1 stop".to_string()
    } else {
        format!("{}+ stops", layovers.len())
    };

    LayoverSummary {
        arrival_time: clock_time(&last.departure_time_of_next_flight).unwrap_or_else(|| V2_DIRECT_ARRIVAL.to_string()),
        total_duration: format_duration(total_minutes),
        stops,
    }
}

/// "2h 5m" style, the format the duration sort parses back
pub fn format_duration(total_minutes: u32) -> String {
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Wall-clock HH:MM of an ISO timestamp. Offsets are ignored: the local time
/// printed on the ticket is what matters.
pub fn clock_time(timestamp: &str) -> Option<String> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.format("%H:%M").to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, pattern) {
            return Some(dt.format("%H:%M").to_string());
        }
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .map(|_| "00:00".to_string())
}

pub fn v2_offers_to_flights(offers: Vec<FlightOfferV2>) -> Result<Vec<Flight>, FlightError> {
    offers
        .into_iter()
        .enumerate()
        .map(|(index, offer)| {
            let price = offer.price.amount().ok_or_else(|| {
                FlightError::MalformedResponse(format!("V2 offer {} has an unreadable price: {:?}", index, offer.price))
            })?;
            let summary = summarize_layovers(&offer.layovers);
            Ok(Flight {
                id: format!("v2-{}", index),
                airline: V2_AIRLINE.to_string(),
                depart_time: clock_time(&offer.departure_date).unwrap_or_else(|| "00:00".to_string()),
                arrive_time: summary.arrival_time,
                depart_code: offer.origin,
                arrive_code: offer.destination,
                duration: summary.total_duration,
                stops: summary.stops,
                price,
            })
        })
        .collect()
}

/// V1 only knows the route and the price; times, duration and stops are placeholders
pub fn v1_response_to_flights(response: SearchResponseV1) -> Result<Vec<Flight>, FlightError> {
    response
        .data
        .into_iter()
        .enumerate()
        .map(|(index, destination)| {
            let price = PriceValue::Text(destination.price.total.clone()).amount().ok_or_else(|| {
                FlightError::MalformedResponse(format!(
                    "V1 destination {} has an unreadable price: {}",
                    index, destination.price.total
                ))
            })?;
            Ok(Flight {
                id: format!("v1-{}", index),
                airline: V1_AIRLINE.to_string(),
                depart_time: V1_DEPARTURE.to_string(),
                arrive_time: V1_ARRIVAL.to_string(),
                depart_code: destination.origin,
                arrive_code: destination.destination,
                duration: V1_DURATION.to_string(),
                stops: "Direct".to_string(),
                price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Endpoint, SearchField, SearchParameters, StopsPreference};
    use crate::transform::transform_search_params;

    fn wire(trip_type: TripType, edit: impl FnOnce(&mut SearchParameters)) -> FlightSearchParams {
        let mut params = SearchParameters::default();
        params.set_airport(Endpoint::Origin, "LHR", "London (LHR)");
        params.set_airport(Endpoint::Destination, "JFK", "New York (JFK)");
        edit(&mut params);
        transform_search_params(&params, trip_type)
    }

    fn offer(json: &str) -> FlightOfferV2 {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_zero_layovers_map_to_direct() {
        let flights = v2_offers_to_flights(vec![offer(
            r#"{"origin":"LHR","destination":"JFK","price":"412.50","departureDate":"2025-06-01T09:15:00","returnDate":"2025-06-08","layovers":[]}"#,
        )])
        .unwrap();
        let flight = &flights[0];
        assert_eq!(flight.id, "v2-0");
        assert_eq!(flight.airline, "Multiple Airlines");
        assert_eq!(flight.stops, "Direct");
        assert_eq!(flight.duration, "2h 00m");
        assert_eq!(flight.depart_time, "09:15");
        assert_eq!(flight.arrive_time, "10:00");
        assert_eq!(flight.price, 412.5);
    }

    #[test]
    fn test_layovers_drive_stops_duration_and_arrival() {
        let flights = v2_offers_to_flights(vec![
            offer(
                r#"{"origin":"LHR","destination":"SYD","price":"980","departureDate":"2025-06-01T22:00:00","layovers":[
                    {"airport":"DXB","durationMinutes":95,"arrivalTimeOfPreviousFlight":"2025-06-02T06:00:00","departureTimeOfNextFlight":"2025-06-02T07:35:00"}
                ]}"#,
            ),
            offer(
                r#"{"origin":"LHR","destination":"SYD","price":"870","departureDate":"2025-06-01","layovers":[
                    {"airport":"DXB","durationMinutes":60,"arrivalTimeOfPreviousFlight":"","departureTimeOfNextFlight":"2025-06-02T07:00:00"},
                    {"airport":"SIN","durationMinutes":45,"arrivalTimeOfPreviousFlight":"","departureTimeOfNextFlight":"2025-06-02T18:45:00"}
                ]}"#,
            ),
        ])
        .unwrap();

        assert_eq!(flights[0].stops, "1 stop");
        assert_eq!(flights[0].duration, "3h 35m");
        assert_eq!(flights[0].arrive_time, "07:35");

        assert_eq!(flights[1].id, "v2-1");
        assert_eq!(flights[1].stops, "2+ stops");
        assert_eq!(flights[1].duration, "3h 45m");
        assert_eq!(flights[1].arrive_time, "18:45");
        assert_eq!(flights[1].depart_time, "00:00");
    }

    #[test]
    fn test_unreadable_price_is_malformed() {
        let result = v2_offers_to_flights(vec![offer(
            r#"{"origin":"LHR","destination":"JFK","price":"call us","departureDate":"2025-06-01","layovers":[]}"#,
        )]);
        assert!(matches!(result, Err(FlightError::MalformedResponse(_))));
    }

    #[test]
    fn test_numeric_price_is_accepted() {
        let flights = v2_offers_to_flights(vec![offer(
            r#"{"origin":"LHR","destination":"JFK","price":399,"departureDate":"2025-06-01","layovers":[]}"#,
        )])
        .unwrap();
        assert_eq!(flights[0].price, 399.0);
    }

    #[test]
    fn test_v1_placeholders() {
        let response: SearchResponseV1 = serde_json::from_str(
            r#"{"data":[{"origin":"LHR","destination":"MAD","departureDate":"2025-06-01","returnDate":"2025-06-08","price":{"total":"120.40"},"links":{}}],"meta":{"currency":"EUR"}}"#,
        )
        .unwrap();
        let flights = v1_response_to_flights(response).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].id, "v1-0");
        assert_eq!(flights[0].airline, "Various Airlines");
        assert_eq!(flights[0].depart_time, "08:00");
        assert_eq!(flights[0].arrive_time, "10:30");
        assert_eq!(flights[0].duration, "2h 30m");
        assert_eq!(flights[0].stops, "Direct");
        assert_eq!(flights[0].arrive_code, "MAD");
    }

    #[test]
    fn test_explore_query_for_specific_roundtrip() {
        let params = wire(TripType::RoundTrip, |p| {
            p.set_field(SearchField::DepartDate("2025-06-01".to_string()));
            p.set_field(SearchField::ReturnDate("2025-06-08".to_string()));
            p.set_field(SearchField::MaxStops(StopsPreference::AtMost(1)));
            p.set_field(SearchField::MaxPrice("900".to_string()));
        });
        let pairs = ExploreRequest::from_params(&params).query_pairs();
        let expected: Vec<(&str, String)> = vec![
            ("origin", "LHR".into()),
            ("destination", "JFK".into()),
            ("departureDate", "2025-06-01".into()),
            ("returnDate", "2025-06-08".into()),
            ("layovers", "1".into()),
            ("maxPrice", "900".into()),
            ("adults", "1".into()),
            ("max", "50".into()),
            ("resultLimit", "50".into()),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_explore_one_way_drops_return_fields() {
        let params = wire(TripType::OneWay, |p| {
            p.set_field(SearchField::DepartDate("2025-06-01".to_string()));
            p.set_field(SearchField::ReturnDate("2025-06-08".to_string()));
        });
        let request = ExploreRequest::from_params(&params);
        assert_eq!(request.return_date, None);
        assert!(request.query_pairs().iter().all(|(k, _)| *k != "returnDate"));
    }

    #[test]
    fn test_explore_duration_mode_uses_earliest_departure() {
        let params = wire(TripType::RoundTrip, |p| {
            p.set_field(SearchField::DateSearchType(DateSearchType::Duration));
            p.set_field(SearchField::TripDuration("7".to_string()));
            p.set_field(SearchField::EarliestDeparture("2025-09-01".to_string()));
            p.set_field(SearchField::DepartDate("2025-01-01".to_string()));
        });
        let request = ExploreRequest::from_params(&params);
        assert_eq!(request.duration_days, Some(7));
        assert_eq!(request.departure_date.as_deref(), Some("2025-09-01"));
    }

    #[test]
    fn test_v1_request() {
        let params = wire(TripType::OneWay, |p| {
            p.set_field(SearchField::DepartDate("2025-06-01".to_string()));
            p.set_field(SearchField::MaxStops(StopsPreference::AtMost(0)));
        });
        let pairs = SearchRequestV1::from_params(&params).query_pairs();
        let expected: Vec<(&str, String)> = vec![
            ("oneWay", "true".into()),
            ("departureDate", "2025-06-01".into()),
            ("nonStop", "true".into()),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_multi_city_body_shape() {
        let request = MultiCityRequest::new(vec![OriginDestination {
            origin_location_code: "LHR".to_string(),
            destination_location_code: "CDG".to_string(),
            departure_date: "2025-06-01".to_string(),
        }]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["originDestinations"][0]["originLocationCode"], "LHR");
        assert_eq!(json["travelers"][0]["travelerType"], 0);
        assert_eq!(json["travelers"][0]["fareOptions"][0], "STANDARD");
        assert_eq!(json["sources"][0], "GDS");
        assert_eq!(json["searchCriteria"]["maxFlightOffers"], 50);
    }

    #[test]
    fn test_multi_city_response_shapes() {
        let bare: MultiCityResponse = serde_json::from_str(
            r#"[{"origin":"LHR","destination":"CDG","price":"99","departureDate":"2025-06-01","layovers":[]}]"#,
        )
        .unwrap();
        assert_eq!(bare.into_offers().len(), 1);

        let wrapped: MultiCityResponse = serde_json::from_str(r#"{"meta":{}}"#).unwrap();
        assert!(wrapped.into_offers().is_empty());
    }

    #[test]
    fn test_clock_time_formats() {
        assert_eq!(clock_time("2025-06-01T07:05:00Z").as_deref(), Some("07:05"));
        assert_eq!(clock_time("2025-06-01T07:05:00+02:00").as_deref(), Some("07:05"));
        assert_eq!(clock_time("2025-06-01T23:40").as_deref(), Some("23:40"));
        assert_eq!(clock_time("2025-06-01").as_deref(), Some("00:00"));
        assert_eq!(clock_time("soon"), None);
    }
}
