//! Results page state: fetch lifecycle, filters, sorting and empty states

use crate::client::SearchSession;
use crate::filter::{apply_filters, available_airlines, max_price_in_data, FilterChange, FilterState, SortKey};
use crate::transform::FlightSearchParams;
use crate::{Flight, FlightError};
use tracing::{debug, info, warn};

pub const MISSING_PARAMS_MESSAGE: &str = "No search parameters provided.";

/// Lifecycle of the one search a results view shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Success(Vec<Flight>),
    Error(String),
}

/// Why there is nothing to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The backend returned no flights
    NoResults,
    /// Flights were returned but the filters hide all of them
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoResults => "No flights found.",
            EmptyState::NoMatches => "No flights match your filters. Try clearing some of them.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    params: Option<FlightSearchParams>,
    state: SearchState,
    filters: FilterState,
    sort_key: SortKey,
}

impl ResultsView {
    /// A view for the payload handed over by the search form (if any)
    pub fn new(params: Option<FlightSearchParams>) -> Self {
        Self {
            params,
            state: SearchState::Idle,
            filters: FilterState::default(),
            sort_key: SortKey::default(),
        }
    }

    pub fn params(&self) -> Option<&FlightSearchParams> {
        self.params.as_ref()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Fetch results for the current payload
    pub async fn load(&mut self, session: &SearchSession) -> Result<(), FlightError> {
        let Some(params) = self.params.clone() else {
            warn!("Results view opened without search parameters");
            self.state = SearchState::Error(MISSING_PARAMS_MESSAGE.to_string());
            return Ok(());
        };
        // Nothing to search until both ends are chosen
        if params.from.is_empty() || params.to.is_empty() {
            self.state = SearchState::Idle;
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.state, SearchState::Loading);
        match session.search(&params).await {
            Ok(flights) => {
                self.set_flights(flights);
                Ok(())
            }
            Err(FlightError::Cancelled) => {
                debug!("Search superseded, restoring the previous state");
                self.state = previous;
                Err(FlightError::Cancelled)
            }
            Err(e) => {
                self.state = SearchState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-run the same search, bypassing cached results
    pub async fn retry(&mut self, session: &SearchSession) -> Result<(), FlightError> {
        info!("Retrying search");
        session.invalidate();
        self.load(session).await
    }

    /// Install fetched flights and fit the price filter to them
    pub fn set_flights(&mut self, flights: Vec<Flight>) {
        info!(flights = flights.len(), "Results loaded");
        self.filters = FilterState::with_max_price(max_price_in_data(&flights));
        self.state = SearchState::Success(flights);
    }

    pub fn flights(&self) -> &[Flight] {
        match &self.state {
            SearchState::Success(flights) => flights,
            _ => &[],
        }
    }

    pub fn apply_filter_change(&mut self, change: FilterChange) {
        self.filters.apply_change(change);
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Reset every filter; the price ceiling goes back to the data maximum
    pub fn clear_filters(&mut self) {
        self.filters = FilterState::with_max_price(self.max_price());
    }

    pub fn visible_flights(&self) -> Vec<Flight> {
        apply_filters(self.flights(), &self.filters, self.sort_key)
    }

    pub fn available_airlines(&self) -> Vec<String> {
        available_airlines(self.flights())
    }

    pub fn max_price(&self) -> f64 {
        max_price_in_data(self.flights())
    }

    /// Set only when a search succeeded but there is nothing to list
    pub fn empty_state(&self) -> Option<EmptyState> {
        match &self.state {
            SearchState::Success(flights) if flights.is_empty() => Some(EmptyState::NoResults),
            SearchState::Success(_) if self.visible_flights().is_empty() => Some(EmptyState::NoMatches),
            _ => None,
        }
    }
}
