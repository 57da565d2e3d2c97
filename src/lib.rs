//! # RouteWise
//!
//! Flight search library: the search form model and its validation, the
//! transformation into backend parameters, a search client that falls back
//! across two backend API versions (and mock data), and the client-side
//! filtering and sorting of results.

pub mod airports;
pub mod api;
pub mod client;
pub mod config;
pub mod display;
pub mod filter;
pub mod form;
pub mod logging;
pub mod mock;
pub mod params;
pub mod results;
pub mod transform;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use airports::{filter_airports, find_airport, Airport, AIRPORTS};
pub use client::{FlightClient, SearchSession};
pub use config::AppConfig;
pub use filter::{apply_filters, FilterChange, FilterState, SortKey, StopCategory, TimePeriod};
pub use form::SearchFormController;
pub use params::{DateSearchType, MultiCityLeg, SearchField, SearchParameters, StopsPreference};
pub use results::{EmptyState, ResultsView, SearchState};
pub use transform::{transform_search_params, FlightSearchParams, OriginDestination};
pub use validation::{validate_search, ValidationReport};

/// Error types for the flights library
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    SearchFailed(String),

    #[error("Search was superseded by a newer search")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parsing failed: {0}")]
    ParseError(String),
}

impl FlightError {
    /// Failures that should move the search on to the next fallback.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FlightError::HttpError(_) | FlightError::Status { .. } | FlightError::MalformedResponse(_)
        )
    }
}

/// Unified flight model shown on the results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub depart_time: String, // HH:MM, 24h
    pub arrive_time: String, // HH:MM, 24h
    pub depart_code: String,
    pub arrive_code: String,
    pub duration: String, // "2h 45m"
    pub stops: String,    // "Direct", "1 stop", "2 stops"
    pub price: f64,
}

/// Trip type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "one-way")]
    OneWay,
    #[default]
    #[serde(rename = "roundtrip")]
    RoundTrip,
    #[serde(rename = "multi-city")]
    MultiCity,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one-way",
            TripType::RoundTrip => "roundtrip",
            TripType::MultiCity => "multi-city",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round-trip" | "roundtrip" => Ok(TripType::RoundTrip),
            "one-way" | "oneway" => Ok(TripType::OneWay),
            "multi-city" | "multicity" => Ok(TripType::MultiCity),
            _ => Err(FlightError::ParseError(format!("Invalid trip type: {}", s))),
        }
    }
}

/// Validate, transform and run a search in one go.
///
/// # Example
/// ```no_run
/// use routewise::{search_flights, AppConfig, SearchFormController, find_airport};
/// use routewise::params::{Endpoint, SearchField};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut form = SearchFormController::new();
/// form.select_airport(Endpoint::Origin, find_airport("LHR").unwrap());
/// form.select_airport(Endpoint::Destination, find_airport("JFK").unwrap());
/// form.update(SearchField::DepartDate("2025-08-15".to_string()));
/// form.update(SearchField::ReturnDate("2025-08-22".to_string()));
///
/// let flights = search_flights(&AppConfig::default(), &mut form).await?;
/// println!("Found {} flights", flights.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_flights(
    config: &AppConfig,
    form: &mut SearchFormController,
) -> Result<Vec<Flight>, FlightError> {
    let params = form.submit()?;
    let client = FlightClient::new(config)?;
    client.search_flights(&params).await
}
