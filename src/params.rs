//! In-memory model of a search form session and its mutations

use crate::airports::Airport;
use crate::FlightError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which group of date fields drives the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateSearchType {
    #[default]
    Specific,
    FlexibleMonth,
    FlexibleDays,
    Duration,
}

impl FromStr for DateSearchType {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "specific" => Ok(DateSearchType::Specific),
            "flexible-month" | "month" => Ok(DateSearchType::FlexibleMonth),
            "flexible-days" | "days" => Ok(DateSearchType::FlexibleDays),
            "duration" => Ok(DateSearchType::Duration),
            _ => Err(FlightError::ParseError(format!("Invalid date search type: {}", s))),
        }
    }
}

/// Maximum number of stops the traveller accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopsPreference {
    #[default]
    Any,
    AtMost(u8),
}

impl StopsPreference {
    pub fn limit(&self) -> Option<u8> {
        match self {
            StopsPreference::Any => None,
            StopsPreference::AtMost(n) => Some(*n),
        }
    }
}

impl fmt::Display for StopsPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopsPreference::Any => f.write_str("any"),
            StopsPreference::AtMost(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for StopsPreference {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(StopsPreference::Any);
        }
        match s.parse::<u8>() {
            Ok(n) if n <= 2 => Ok(StopsPreference::AtMost(n)),
            _ => Err(FlightError::ParseError(format!("Invalid max stops: {}", s))),
        }
    }
}

/// One origin -> destination -> date triple of a multi-city itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiCityLeg {
    pub id: u32,
    pub from: String,
    pub to: String,
    pub date: String,
}

impl MultiCityLeg {
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            from: String::new(),
            to: String::new(),
            date: String::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty() && !self.date.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Departure,
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegField {
    From(String),
    To(String),
    Date(String),
}

/// A single-field update. Each variant carries the typed value for its field.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchField {
    DateSearchType(DateSearchType),
    DepartDate(String),
    ReturnDate(String),
    FlexibleMonth(String),
    FlexibleYear(String),
    DepartureDays(Vec<Weekday>),
    ReturnDays(Vec<Weekday>),
    TripDuration(String),
    EarliestDeparture(String),
    Travellers(String),
    MaxStops(StopsPreference),
    MinLayover(String),
    MaxLayover(String),
    LayoverCities(Vec<String>),
    MaxPrice(String),
}

/// Search form state.
///
/// Fields the backend receives as numbers are kept as the text the user typed;
/// [`crate::transform`] does the parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    pub origin: String,
    pub origin_display: String,
    pub destination: String,
    pub destination_display: String,

    pub date_search_type: DateSearchType,
    pub depart_date: String,
    pub return_date: String,
    pub flexible_month: String,
    pub flexible_year: String,
    pub selected_departure_days: Vec<Weekday>,
    pub selected_return_days: Vec<Weekday>,
    pub trip_duration: String,
    pub earliest_departure: String,

    pub travellers: String,
    pub max_stops: StopsPreference,
    pub min_layover: String,
    pub max_layover: String,
    pub preferred_layover_cities: Vec<String>,
    pub max_price: String,

    pub multi_city_legs: Vec<MultiCityLeg>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            origin: String::new(),
            origin_display: String::new(),
            destination: String::new(),
            destination_display: String::new(),
            date_search_type: DateSearchType::Specific,
            depart_date: String::new(),
            return_date: String::new(),
            flexible_month: String::new(),
            flexible_year: String::new(),
            selected_departure_days: Vec::new(),
            selected_return_days: Vec::new(),
            trip_duration: String::new(),
            earliest_departure: String::new(),
            travellers: "1".to_string(),
            max_stops: StopsPreference::Any,
            min_layover: String::new(),
            max_layover: String::new(),
            preferred_layover_cities: Vec::new(),
            max_price: String::new(),
            multi_city_legs: vec![MultiCityLeg::empty(1), MultiCityLeg::empty(2)],
        }
    }
}

impl SearchParameters {
    pub const MIN_LEGS: usize = 2;

    /// Replace one field, leaving the rest untouched
    pub fn set_field(&mut self, field: SearchField) {
        match field {
            SearchField::DateSearchType(v) => self.date_search_type = v,
            SearchField::DepartDate(v) => self.depart_date = v,
            SearchField::ReturnDate(v) => self.return_date = v,
            SearchField::FlexibleMonth(v) => self.flexible_month = v,
            SearchField::FlexibleYear(v) => self.flexible_year = v,
            SearchField::DepartureDays(days) => self.selected_departure_days = dedup_days(days),
            SearchField::ReturnDays(days) => self.selected_return_days = dedup_days(days),
            SearchField::TripDuration(v) => self.trip_duration = v,
            SearchField::EarliestDeparture(v) => self.earliest_departure = v,
            SearchField::Travellers(v) => self.travellers = v,
            SearchField::MaxStops(v) => self.max_stops = v,
            SearchField::MinLayover(v) => self.min_layover = v,
            SearchField::MaxLayover(v) => self.max_layover = v,
            SearchField::LayoverCities(cities) => {
                self.preferred_layover_cities.clear();
                for city in cities {
                    self.add_layover_city(&city);
                }
            }
            SearchField::MaxPrice(v) => self.max_price = v,
        }
    }

    /// Copy-on-write variant of [`set_field`](Self::set_field)
    pub fn with_field(&self, field: SearchField) -> Self {
        let mut next = self.clone();
        next.set_field(field);
        next
    }

    /// Set code and display text together
    pub fn set_airport(&mut self, endpoint: Endpoint, code: &str, display: &str) {
        let (code_slot, display_slot) = match endpoint {
            Endpoint::Origin => (&mut self.origin, &mut self.origin_display),
            Endpoint::Destination => (&mut self.destination, &mut self.destination_display),
        };
        *code_slot = code.to_string();
        *display_slot = display.to_string();
    }

    pub fn select_airport(&mut self, endpoint: Endpoint, airport: &Airport) {
        self.set_airport(endpoint, airport.code, &airport.label());
    }

    pub fn clear_airport(&mut self, endpoint: Endpoint) {
        self.set_airport(endpoint, "", "");
    }

    /// Exchange origin and destination (code and display). Equal endpoints are allowed.
    pub fn swap_airports(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
        std::mem::swap(&mut self.origin_display, &mut self.destination_display);
    }

    /// Append an empty leg and return its id
    pub fn add_leg(&mut self) -> u32 {
        let id = self.multi_city_legs.iter().map(|leg| leg.id).max().unwrap_or(0) + 1;
        self.multi_city_legs.push(MultiCityLeg::empty(id));
        id
    }

    /// Remove a leg by id. Returns false (and does nothing) when the itinerary
    /// would drop below two legs or no leg has that id.
    pub fn remove_leg(&mut self, id: u32) -> bool {
        if self.multi_city_legs.len() <= Self::MIN_LEGS {
            return false;
        }
        match self.multi_city_legs.iter().position(|leg| leg.id == id) {
            Some(index) => {
                self.multi_city_legs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Update one field of a leg; unknown ids are ignored
    pub fn update_leg(&mut self, id: u32, field: LegField) -> bool {
        let Some(leg) = self.multi_city_legs.iter_mut().find(|leg| leg.id == id) else {
            return false;
        };
        match field {
            LegField::From(v) => leg.from = v,
            LegField::To(v) => leg.to = v,
            LegField::Date(v) => leg.date = v,
        }
        true
    }

    /// Add the day if absent, remove it if present
    pub fn toggle_day(&mut self, kind: DayKind, day: Weekday) {
        let days = match kind {
            DayKind::Departure => &mut self.selected_departure_days,
            DayKind::Return => &mut self.selected_return_days,
        };
        match days.iter().position(|d| *d == day) {
            Some(index) => {
                days.remove(index);
            }
            None => days.push(day),
        }
    }

    /// Cities are stored upper-cased; duplicates are compared case-insensitively
    pub fn add_layover_city(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let normalized = name.to_uppercase();
        if self.preferred_layover_cities.contains(&normalized) {
            return false;
        }
        self.preferred_layover_cities.push(normalized);
        true
    }

    pub fn remove_layover_city(&mut self, name: &str) -> bool {
        let normalized = name.trim().to_uppercase();
        match self.preferred_layover_cities.iter().position(|c| *c == normalized) {
            Some(index) => {
                self.preferred_layover_cities.remove(index);
                true
            }
            None => false,
        }
    }
}

fn dedup_days(days: Vec<Weekday>) -> Vec<Weekday> {
    let mut unique = Vec::with_capacity(days.len());
    for day in days {
        if !unique.contains(&day) {
            unique.push(day);
        }
    }
    unique
}

/// Parse a comma-separated day list such as "Fri,Sat"
pub fn parse_weekdays(list: &str) -> Result<Vec<Weekday>, FlightError> {
    let days = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Weekday>()
                .map_err(|_| FlightError::ParseError(format!("Invalid weekday: {}", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedup_days(days))
}
