//! HTTP client for the flight search backend

use crate::api::{
    v1_response_to_flights, v2_offers_to_flights, ExploreRequest, FlightOfferV2, MultiCityRequest,
    MultiCityResponse, SearchRequestV1, SearchResponseV1, EXPLORE_PATH, MULTI_CITY_PATH, V1_SEARCH_PATH,
};
use crate::config::AppConfig;
use crate::mock::{generate_mock_flights, today};
use crate::transform::FlightSearchParams;
use crate::{Flight, FlightError, TripType};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search flights. Please try again later.";

/// How long a finished search is served from cache
pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Main flight client for the search backend
#[derive(Debug, Clone)]
pub struct FlightClient {
    http_client: Client,
    config: AppConfig,
}

impl FlightClient {
    /// Create a new flight client
    pub fn new(config: &AppConfig) -> Result<Self, FlightError> {
        debug!(api_url = %config.api_url, timeout_ms = config.api_timeout.as_millis(), "Creating new flight client");
        let http_client = Client::builder()
            .user_agent(concat!("routewise/", env!("CARGO_PKG_VERSION")))
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Search with the full fallback chain: V2, then V1, then (in
    /// development) mock data. Only the final failure reaches the caller.
    #[instrument(level = "info", skip(self, params), fields(from = %params.from, to = %params.to, trip_type = %params.trip_type))]
    pub async fn search_flights(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, FlightError> {
        if self.config.use_mock_data {
            info!("Mock data enabled, skipping backend");
            return Ok(self.mock_flights(params));
        }

        let primary_error = match self.search_v2(params).await {
            Ok(flights) => {
                info!(flights_found = flights.len(), "V2 search completed");
                return Ok(flights);
            }
            Err(e) => e,
        };
        log_attempt_failure("V2", &primary_error);

        let fallback_error = match self.search_v1_fallback(params).await {
            Ok(flights) => {
                info!(flights_found = flights.len(), "V1 fallback search completed");
                return Ok(flights);
            }
            Err(e) => e,
        };
        log_attempt_failure("V1", &fallback_error);

        if self.config.is_development {
            warn!("Using mock data due to API failure");
            return Ok(self.mock_flights(params));
        }

        error!("All flight search attempts failed");
        Err(FlightError::SearchFailed(SEARCH_FAILED_MESSAGE.to_string()))
    }

    /// Search that stops early once `cancel` fires
    pub async fn search_flights_cancellable(
        &self,
        params: &FlightSearchParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<Flight>, FlightError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Search cancelled");
                Err(FlightError::Cancelled)
            }
            result = self.search_flights(params) => result,
        }
    }

    async fn search_v2(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, FlightError> {
        let offers = match (&params.trip_type, &params.multi_city_legs) {
            (TripType::MultiCity, Some(legs)) => {
                self.search_multi_city(&MultiCityRequest::new(legs.clone())).await?
            }
            _ => self.search_explore(&ExploreRequest::from_params(params)).await?,
        };
        v2_offers_to_flights(offers)
    }

    async fn search_v1_fallback(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, FlightError> {
        let response = self.search_v1(&params.from, &SearchRequestV1::from_params(params)).await?;
        v1_response_to_flights(response)
    }

    /// `GET /api/FlightSearch/explore`
    pub async fn search_explore(&self, request: &ExploreRequest) -> Result<Vec<FlightOfferV2>, FlightError> {
        let pairs = request.query_pairs();
        debug!(?pairs, "Sending V2 explore request");
        let builder = self.http_client.get(self.url(EXPLORE_PATH)).query(&pairs);
        self.send_json(builder, "V2 explore").await
    }

    /// `POST /api/FlightSearch/multi-city`
    pub async fn search_multi_city(&self, request: &MultiCityRequest) -> Result<Vec<FlightOfferV2>, FlightError> {
        debug!(legs = request.origin_destinations.len(), "Sending multi-city request");
        let builder = self.http_client.post(self.url(MULTI_CITY_PATH)).json(request);
        let response: MultiCityResponse = self.send_json(builder, "V2 multi-city").await?;
        Ok(response.into_offers())
    }

    /// `GET /api/FlightSearch/search/{origin}`
    pub async fn search_v1(&self, origin: &str, request: &SearchRequestV1) -> Result<SearchResponseV1, FlightError> {
        let pairs = request.query_pairs();
        debug!(origin, ?pairs, "Sending V1 search request");
        let url = format!("{}/{}", self.url(V1_SEARCH_PATH), origin);
        let builder = self.http_client.get(url).query(&pairs);
        self.send_json(builder, "V1 search").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn mock_flights(&self, params: &FlightSearchParams) -> Vec<Flight> {
        let date = params.depart_date.clone().unwrap_or_else(today);
        generate_mock_flights(&params.from, &params.to, &date)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, endpoint: &str) -> Result<T, FlightError> {
        let start_time = Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        info!(
            endpoint,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(endpoint, status = %status, body = %body, "API error");
            return Err(FlightError::Status { status, body });
        }

        let body = response.text().await?;
        debug!(endpoint, body_length = body.len(), "Received response body");
        serde_json::from_str(&body).map_err(|e| FlightError::MalformedResponse(format!("{}: {}", endpoint, e)))
    }
}

fn log_attempt_failure(attempt: &str, err: &FlightError) {
    match err {
        FlightError::MalformedResponse(detail) => {
            warn!(attempt, detail = %detail, "Response did not match the expected shape")
        }
        FlightError::HttpError(e) if e.is_timeout() => warn!(attempt, error = %e, "Request timed out"),
        other => warn!(attempt, error = %other, "Request failed"),
    }
}

struct CachedSearch {
    fetched_at: Instant,
    flights: Vec<Flight>,
}

/// Search entry point for a results view.
///
/// A new search cancels the one still in flight, and finished searches are
/// reused for [`STALE_TIME`] when the same parameters come back.
pub struct SearchSession {
    client: FlightClient,
    stale_time: Duration,
    current: Mutex<CancellationToken>,
    cache: Mutex<HashMap<FlightSearchParams, CachedSearch>>,
}

impl SearchSession {
    pub fn new(client: FlightClient) -> Self {
        Self::with_stale_time(client, STALE_TIME)
    }

    pub fn with_stale_time(client: FlightClient, stale_time: Duration) -> Self {
        Self {
            client,
            stale_time,
            current: Mutex::new(CancellationToken::new()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &FlightClient {
        &self.client
    }

    /// Run a search, superseding any search still in flight.
    ///
    /// A superseded call resolves to [`FlightError::Cancelled`].
    pub async fn search(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, FlightError> {
        // Supersede first, even when the answer comes from cache
        let token = {
            let mut current = lock(&self.current);
            current.cancel();
            let token = CancellationToken::new();
            *current = token.clone();
            token
        };

        if let Some(flights) = self.cached(params) {
            debug!(flights = flights.len(), "Serving search from cache");
            return Ok(flights);
        }

        let result = self.client.search_flights_cancellable(params, &token).await;

        if token.is_cancelled() {
            return Err(FlightError::Cancelled);
        }
        if let Ok(flights) = &result {
            let mut cache = lock(&self.cache);
            cache.retain(|_, entry| entry.fetched_at.elapsed() < self.stale_time);
            cache.insert(
                params.clone(),
                CachedSearch {
                    fetched_at: Instant::now(),
                    flights: flights.clone(),
                },
            );
        }
        result
    }

    /// Cancel whatever search is in flight
    pub fn cancel(&self) {
        lock(&self.current).cancel();
    }

    /// Forget cached results so the next search hits the backend
    pub fn invalidate(&self) {
        lock(&self.cache).clear();
    }

    fn cached(&self, params: &FlightSearchParams) -> Option<Vec<Flight>> {
        let mut cache = lock(&self.cache);
        match cache.get(params) {
            Some(entry) if entry.fetched_at.elapsed() < self.stale_time => Some(entry.flights.clone()),
            Some(_) => {
                cache.remove(params);
                None
            }
            None => None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Endpoint, SearchField, SearchParameters};
    use crate::transform::transform_search_params;

    fn params() -> FlightSearchParams {
        let mut form = SearchParameters::default();
        form.set_airport(Endpoint::Origin, "LHR", "London (LHR)");
        form.set_airport(Endpoint::Destination, "JFK", "New York (JFK)");
        form.set_field(SearchField::DepartDate("2025-06-01".to_string()));
        transform_search_params(&form, TripType::OneWay)
    }

    fn unreachable_config(is_development: bool) -> AppConfig {
        AppConfig {
            // Port 9 (discard) on localhost refuses connections
            api_url: "http://127.0.0.1:9".to_string(),
            use_mock_data: false,
            api_timeout: Duration::from_secs(2),
            is_development,
        }
    }

    #[test]
    fn test_flight_client_creation() {
        let client = FlightClient::new(&AppConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_join() {
        let config = AppConfig {
            api_url: "http://example.com/".to_string(),
            ..AppConfig::default()
        };
        let client = FlightClient::new(&config).unwrap();
        assert_eq!(client.url(EXPLORE_PATH), "http://example.com/api/FlightSearch/explore");
    }

    #[tokio::test]
    async fn test_mock_mode_skips_network() {
        let config = AppConfig {
            use_mock_data: true,
            ..unreachable_config(false)
        };
        let client = FlightClient::new(&config).unwrap();
        let flights = client.search_flights(&params()).await.unwrap();
        assert!((6..=10).contains(&flights.len()));
        assert!(flights.iter().all(|f| f.depart_code == "LHR" && f.arrive_code == "JFK"));
    }

    #[tokio::test]
    async fn test_production_surfaces_single_error() {
        let client = FlightClient::new(&unreachable_config(false)).unwrap();
        match client.search_flights(&params()).await {
            Err(FlightError::SearchFailed(message)) => assert_eq!(message, SEARCH_FAILED_MESSAGE),
            other => panic!("expected SearchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_development_falls_back_to_mock() {
        let client = FlightClient::new(&unreachable_config(true)).unwrap();
        let flights = client.search_flights(&params()).await.unwrap();
        assert!(!flights.is_empty());
        assert!(flights[0].id.starts_with("mock-"));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let client = FlightClient::new(&unreachable_config(true)).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = client.search_flights_cancellable(&params(), &token).await;
        assert!(matches!(result, Err(FlightError::Cancelled)));
    }

    #[tokio::test]
    async fn test_session_caches_until_invalidated() {
        let config = AppConfig {
            use_mock_data: true,
            ..unreachable_config(false)
        };
        let session = SearchSession::new(FlightClient::new(&config).unwrap());
        let first = session.search(&params()).await.unwrap();
        let second = session.search(&params()).await.unwrap();
        assert_eq!(first, second);

        session.invalidate();
        assert!(session.cached(&params()).is_none());
    }

    #[tokio::test]
    async fn test_session_zero_stale_time_never_caches() {
        let config = AppConfig {
            use_mock_data: true,
            ..unreachable_config(false)
        };
        let session = SearchSession::with_stale_time(FlightClient::new(&config).unwrap(), Duration::ZERO);
        session.search(&params()).await.unwrap();
        assert!(session.cached(&params()).is_none());
    }

    #[tokio::test]
    async fn test_session_drops_expired_entries_for_other_searches() {
        let config = AppConfig {
            use_mock_data: true,
            ..unreachable_config(false)
        };
        let session = SearchSession::with_stale_time(FlightClient::new(&config).unwrap(), Duration::from_millis(20));
        let mut other = params();
        other.to = "CDG".to_string();

        session.search(&params()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        session.search(&other).await.unwrap();

        let cache = lock(&session.cache);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&other));
    }

    #[tokio::test]
    async fn test_cached_search_still_supersedes_in_flight_one() {
        let config = AppConfig {
            use_mock_data: true,
            ..unreachable_config(false)
        };
        let session = SearchSession::new(FlightClient::new(&config).unwrap());
        session.search(&params()).await.unwrap();

        let in_flight = lock(&session.current).clone();
        session.search(&params()).await.unwrap();
        assert!(in_flight.is_cancelled());
    }
}
