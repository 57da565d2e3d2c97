//! Maps the form model to the parameters handed to the results page and the backend

use crate::params::{DateSearchType, SearchParameters};
use crate::TripType;
use serde::{Deserialize, Serialize};

/// One leg in the backend's multi-city shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginDestination {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,
}

/// Flattened search parameters: the navigation payload between the form and
/// the results view, and the input of [`crate::FlightClient::search_flights`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchParams {
    pub from: String,
    pub to: String,
    pub from_display: String,
    pub to_display: String,
    pub date_search_type: DateSearchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depart_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_day_of_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_day_of_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_departure: Option<String>,
    pub travellers: u32,
    pub trip_type: TripType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stops: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_layover_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_layover_time: Option<u32>,
    #[serde(default)]
    pub preferred_layover_cities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_city_legs: Option<Vec<OriginDestination>>,
}

/// Build the wire parameters from the form state.
///
/// Only the first selected weekday of each set is carried over; the backend
/// accepts a single day per direction.
pub fn transform_search_params(params: &SearchParameters, trip_type: TripType) -> FlightSearchParams {
    FlightSearchParams {
        from: params.origin.clone(),
        to: params.destination.clone(),
        from_display: params.origin_display.clone(),
        to_display: params.destination_display.clone(),
        date_search_type: params.date_search_type,
        depart_date: non_empty(&params.depart_date),
        return_date: non_empty(&params.return_date),
        year: parse_number(&params.flexible_year),
        month: parse_number(&params.flexible_month),
        departure_day_of_week: params
            .selected_departure_days
            .first()
            .map(|day| day.num_days_from_sunday()),
        return_day_of_week: params
            .selected_return_days
            .first()
            .map(|day| day.num_days_from_sunday()),
        duration_days: parse_number(&params.trip_duration),
        earliest_departure: non_empty(&params.earliest_departure),
        travellers: parse_number(&params.travellers).unwrap_or(1),
        trip_type,
        max_stops: params.max_stops.limit().map(u32::from),
        min_layover_time: parse_number(&params.min_layover),
        max_layover_time: parse_number(&params.max_layover),
        preferred_layover_cities: params.preferred_layover_cities.clone(),
        max_price: parse_number(&params.max_price),
        multi_city_legs: (trip_type == TripType::MultiCity).then(|| {
            params
                .multi_city_legs
                .iter()
                .map(|leg| OriginDestination {
                    origin_location_code: leg.from.clone(),
                    destination_location_code: leg.to.clone(),
                    departure_date: leg.date.clone(),
                })
                .collect()
        }),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Leading-integer parse: "12" and "12.5" give 12, "" and "abc" give None
fn parse_number(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
