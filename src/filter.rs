//! Client-side filtering, sorting and facet derivation over fetched flights

use crate::{Flight, FlightError};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)h\s*(\d+)m").expect("duration pattern is valid"));

/// Price slider ceiling when there is nothing to derive it from
pub const DEFAULT_MAX_PRICE: f64 = 2000.0;

/// Stop-count buckets offered in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StopCategory {
    Direct,
    OneStop,
    TwoPlus,
}

impl StopCategory {
    pub const ALL: [StopCategory; 3] = [StopCategory::Direct, StopCategory::OneStop, StopCategory::TwoPlus];

    pub fn label(&self) -> &'static str {
        match self {
            StopCategory::Direct => "Direct",
            StopCategory::OneStop => "1 stop",
            StopCategory::TwoPlus => "2+ stops",
        }
    }

    pub fn matches(&self, stops: &str) -> bool {
        match self {
            StopCategory::Direct => stops == "Direct",
            StopCategory::OneStop => stops == "1 stop",
            StopCategory::TwoPlus => stops.contains('2') || stops.contains('3') || stops.contains('+'),
        }
    }
}

impl fmt::Display for StopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StopCategory {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "0" => Ok(StopCategory::Direct),
            "1 stop" | "1" => Ok(StopCategory::OneStop),
            "2+ stops" | "2+" | "2" => Ok(StopCategory::TwoPlus),
            _ => Err(FlightError::ParseError(format!("Invalid stop category: {}", s))),
        }
    }
}

/// Named departure windows, half-open hour ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TimePeriod {
    EarlyMorning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [
        TimePeriod::EarlyMorning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
        TimePeriod::Night,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::EarlyMorning => "Early Morning",
            TimePeriod::Afternoon => "Afternoon",
            TimePeriod::Evening => "Evening",
            TimePeriod::Night => "Night",
        }
    }

    pub fn time_range(&self) -> &'static str {
        match self {
            TimePeriod::EarlyMorning => "6AM - 12PM",
            TimePeriod::Afternoon => "12PM - 6PM",
            TimePeriod::Evening => "6PM - 12AM",
            TimePeriod::Night => "12AM - 6AM",
        }
    }

    pub fn hour_range(&self) -> (u32, u32) {
        match self {
            TimePeriod::EarlyMorning => (6, 12),
            TimePeriod::Afternoon => (12, 18),
            TimePeriod::Evening => (18, 24),
            TimePeriod::Night => (0, 6),
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        let (start, end) = self.hour_range();
        hour >= start && hour < end
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "early morning" | "morning" => Ok(TimePeriod::EarlyMorning),
            "afternoon" => Ok(TimePeriod::Afternoon),
            "evening" => Ok(TimePeriod::Evening),
            "night" => Ok(TimePeriod::Night),
            _ => Err(FlightError::ParseError(format!("Invalid time period: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SortKey {
    #[default]
    Price,
    Duration,
    Departure,
    Stops,
}

impl FromStr for SortKey {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(SortKey::Price),
            "duration" => Ok(SortKey::Duration),
            "departure" => Ok(SortKey::Departure),
            "stops" => Ok(SortKey::Stops),
            _ => Err(FlightError::ParseError(format!("Invalid sort key: {}", s))),
        }
    }
}

/// Active result filters. An empty set means that facet is not filtered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    /// Lower bound is always 0
    pub price_range: (f64, f64),
    pub stops: BTreeSet<StopCategory>,
    pub airlines: BTreeSet<String>,
    pub departure_times: BTreeSet<TimePeriod>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_max_price(DEFAULT_MAX_PRICE)
    }
}

/// A change coming from the filters sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    MaxPrice(f64),
    Stops(BTreeSet<StopCategory>),
    Airlines(BTreeSet<String>),
    DepartureTimes(BTreeSet<TimePeriod>),
    ToggleStop(StopCategory),
    ToggleAirline(String),
    ToggleDepartureTime(TimePeriod),
}

impl FilterState {
    pub fn with_max_price(max_price: f64) -> Self {
        Self {
            price_range: (0.0, max_price),
            stops: BTreeSet::new(),
            airlines: BTreeSet::new(),
            departure_times: BTreeSet::new(),
        }
    }

    pub fn apply_change(&mut self, change: FilterChange) {
        match change {
            FilterChange::MaxPrice(max) => self.price_range = (0.0, max.max(0.0)),
            FilterChange::Stops(stops) => self.stops = stops,
            FilterChange::Airlines(airlines) => self.airlines = airlines,
            FilterChange::DepartureTimes(periods) => self.departure_times = periods,
            FilterChange::ToggleStop(stop) => toggle(&mut self.stops, stop),
            FilterChange::ToggleAirline(airline) => toggle(&mut self.airlines, airline),
            FilterChange::ToggleDepartureTime(period) => toggle(&mut self.departure_times, period),
        }
    }

    pub fn matches(&self, flight: &Flight) -> bool {
        if flight.price > self.price_range.1 {
            return false;
        }
        if !self.stops.is_empty() && !self.stops.iter().any(|c| c.matches(&flight.stops)) {
            return false;
        }
        if !self.airlines.is_empty() && !self.airlines.contains(&flight.airline) {
            return false;
        }
        if !self.departure_times.is_empty() {
            let Some(hour) = departure_hour(&flight.depart_time) else {
                return false;
            };
            if !self.departure_times.iter().any(|p| p.contains(hour)) {
                return false;
            }
        }
        true
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if set.contains(&value) {
        set.remove(&value);
    } else {
        set.insert(value);
    }
}

/// Filtered and sorted copy of `flights`; the input is left untouched.
///
/// Sorting is stable, so equal keys keep their fetched order.
pub fn apply_filters(flights: &[Flight], filters: &FilterState, sort_key: SortKey) -> Vec<Flight> {
    let mut visible: Vec<Flight> = flights.iter().filter(|f| filters.matches(f)).cloned().collect();
    visible.sort_by(|a, b| compare(a, b, sort_key));
    visible
}

fn compare(a: &Flight, b: &Flight, sort_key: SortKey) -> Ordering {
    match sort_key {
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Duration => duration_minutes(&a.duration).cmp(&duration_minutes(&b.duration)),
        SortKey::Departure => a.depart_time.cmp(&b.depart_time),
        SortKey::Stops => stops_count(&a.stops).cmp(&stops_count(&b.stops)),
    }
}

/// Minutes in a "Xh Ym" string; anything unparseable counts as 0
pub fn duration_minutes(duration: &str) -> u32 {
    DURATION_RE
        .captures(duration)
        .and_then(|caps| {
            let hours: u32 = caps[1].parse().ok()?;
            let minutes: u32 = caps[2].parse().ok()?;
            Some(hours * 60 + minutes)
        })
        .unwrap_or(0)
}

/// "Direct" is 0, "1 stop" is 1, everything else 2
pub fn stops_count(stops: &str) -> u8 {
    match stops {
        "Direct" => 0,
        "1 stop" => 1,
        _ => 2,
    }
}

/// Hour of an "HH:MM" time
pub fn departure_hour(time: &str) -> Option<u32> {
    let (hour, _) = time.trim().split_once(':')?;
    hour.parse::<u32>().ok().filter(|h| *h < 24)
}

/// Distinct airlines in first-appearance order
pub fn available_airlines(flights: &[Flight]) -> Vec<String> {
    let mut airlines: Vec<String> = Vec::new();
    for flight in flights {
        if !airlines.contains(&flight.airline) {
            airlines.push(flight.airline.clone());
        }
    }
    airlines
}

/// Highest price rounded up to the next hundred
pub fn max_price_in_data(flights: &[Flight]) -> f64 {
    flights
        .iter()
        .map(|f| f.price)
        .reduce(f64::max)
        .map(|max| (max / 100.0).ceil() * 100.0)
        .unwrap_or(DEFAULT_MAX_PRICE)
}
