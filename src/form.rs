//! Search form controller: owns the form state and turns it into a search

use crate::airports::{filter_airports, Airport};
use crate::params::{DayKind, Endpoint, LegField, SearchField, SearchParameters};
use crate::transform::{transform_search_params, FlightSearchParams};
use crate::validation::validate_search;
use crate::{FlightError, TripType};
use chrono::Weekday;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

static LAYOVER_HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)h?$").expect("layover pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoverBound {
    Min,
    Max,
}

/// "3h" or "3" -> "3"; anything else clears the field
pub fn parse_layover_hours(value: &str) -> String {
    LAYOVER_HOURS_RE
        .captures(value.trim())
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct SearchFormController {
    params: SearchParameters,
    trip_type: TripType,
    show_advanced: bool,
    errors: Vec<String>,
}

impl SearchFormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &SearchParameters {
        &self.params
    }

    pub fn trip_type(&self) -> TripType {
        self.trip_type
    }

    pub fn set_trip_type(&mut self, trip_type: TripType) {
        self.trip_type = trip_type;
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    pub fn toggle_advanced(&mut self) {
        self.show_advanced = !self.show_advanced;
    }

    /// Errors from the last failed submit, shown next to the search button
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn dismiss_errors(&mut self) {
        self.errors.clear();
    }

    pub fn update(&mut self, field: SearchField) {
        self.params.set_field(field);
    }

    /// Autocomplete suggestions; an empty list means "no airports found"
    pub fn airport_suggestions(&self, query: &str) -> Vec<&'static Airport> {
        filter_airports(query)
    }

    pub fn select_airport(&mut self, endpoint: Endpoint, airport: &Airport) {
        debug!(?endpoint, code = airport.code, "Airport selected");
        self.params.select_airport(endpoint, airport);
    }

    /// Free-text entry the directory does not know about
    pub fn set_airport_text(&mut self, endpoint: Endpoint, code: &str, display: &str) {
        self.params.set_airport(endpoint, code, display);
    }

    pub fn clear_airport(&mut self, endpoint: Endpoint) {
        self.params.clear_airport(endpoint);
    }

    pub fn swap_airports(&mut self) {
        self.params.swap_airports();
    }

    pub fn add_leg(&mut self) -> u32 {
        self.params.add_leg()
    }

    pub fn remove_leg(&mut self, id: u32) -> bool {
        self.params.remove_leg(id)
    }

    pub fn update_leg(&mut self, id: u32, field: LegField) -> bool {
        self.params.update_leg(id, field)
    }

    pub fn toggle_day(&mut self, kind: DayKind, day: Weekday) {
        self.params.toggle_day(kind, day);
    }

    pub fn add_layover_city(&mut self, name: &str) -> bool {
        self.params.add_layover_city(name)
    }

    pub fn remove_layover_city(&mut self, name: &str) -> bool {
        self.params.remove_layover_city(name)
    }

    pub fn set_layover_bound(&mut self, bound: LayoverBound, text: &str) {
        let hours = parse_layover_hours(text);
        match bound {
            LayoverBound::Min => self.params.set_field(SearchField::MinLayover(hours)),
            LayoverBound::Max => self.params.set_field(SearchField::MaxLayover(hours)),
        }
    }

    /// Validate and build the payload for the results view.
    ///
    /// Failing validation keeps the errors on the form and never reaches the network.
    pub fn submit(&mut self) -> Result<FlightSearchParams, FlightError> {
        let report = validate_search(&self.params, self.trip_type);
        if !report.is_valid() {
            info!(errors = report.errors.len(), "Search form is incomplete");
            self.errors = report.errors.clone();
            return Err(FlightError::Validation(report.errors));
        }

        self.errors.clear();
        let payload = transform_search_params(&self.params, self.trip_type);
        info!(
            from = %payload.from,
            to = %payload.to,
            trip_type = %payload.trip_type,
            date_search_type = ?payload.date_search_type,
            "Search submitted"
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::find_airport;

    fn ready_form() -> SearchFormController {
        let mut form = SearchFormController::new();
        form.select_airport(Endpoint::Origin, find_airport("LHR").unwrap());
        form.select_airport(Endpoint::Destination, find_airport("JFK").unwrap());
        form.update(SearchField::DepartDate("2025-06-01".to_string()));
        form.update(SearchField::ReturnDate("2025-06-08".to_string()));
        form
    }

    #[test]
    fn test_defaults_to_roundtrip() {
        let form = SearchFormController::new();
        assert_eq!(form.trip_type(), TripType::RoundTrip);
        assert!(!form.show_advanced());
    }

    #[test]
    fn test_submit_failure_keeps_errors() {
        let mut form = SearchFormController::new();
        form.select_airport(Endpoint::Origin, find_airport("LHR").unwrap());
        form.select_airport(Endpoint::Destination, find_airport("JFK").unwrap());

        match form.submit() {
            Err(FlightError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "Please select a departure date".to_string(),
                        "Please select a return date for round trip".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(form.errors().len(), 2);

        form.dismiss_errors();
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_submit_success_builds_payload() {
        let mut form = ready_form();
        let payload = form.submit().unwrap();
        assert_eq!(payload.from, "LHR");
        assert_eq!(payload.from_display, "London (LHR)");
        assert_eq!(payload.return_date.as_deref(), Some("2025-06-08"));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_successful_submit_clears_previous_errors() {
        let mut form = ready_form();
        form.update(SearchField::DepartDate(String::new()));
        assert!(form.submit().is_err());
        form.update(SearchField::DepartDate("2025-06-01".to_string()));
        assert!(form.submit().is_ok());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_layover_bound_normalization() {
        let mut form = SearchFormController::new();
        form.set_layover_bound(LayoverBound::Min, "3h");
        form.set_layover_bound(LayoverBound::Max, "twelve");
        assert_eq!(form.params().min_layover, "3");
        assert_eq!(form.params().max_layover, "");
        assert_eq!(parse_layover_hours("12"), "12");
    }

    #[test]
    fn test_multi_city_submit_carries_legs() {
        let mut form = ready_form();
        form.set_trip_type(TripType::MultiCity);
        let third = form.add_leg();
        for (id, from, to, date) in [
            (1, "LHR", "CDG", "2025-06-01"),
            (2, "CDG", "FCO", "2025-06-04"),
            (third, "FCO", "LHR", "2025-06-09"),
        ] {
            form.update_leg(id, LegField::From(from.to_string()));
            form.update_leg(id, LegField::To(to.to_string()));
            form.update_leg(id, LegField::Date(date.to_string()));
        }
        let payload = form.submit().unwrap();
        let legs = payload.multi_city_legs.unwrap();
        assert_eq!(legs.len(), 3);
        assert_eq!(legs[2].destination_location_code, "LHR");
    }

    #[test]
    fn test_airport_suggestions() {
        let form = SearchFormController::new();
        assert_eq!(form.airport_suggestions("tokyo")[0].code, "HND");
        assert!(form.airport_suggestions("atlantis").is_empty());
    }
}
