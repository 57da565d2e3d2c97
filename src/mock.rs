//! Synthetic flights for offline use and backend outages

use crate::api::format_duration;
use crate::Flight;
use chrono::{Local, NaiveTime, Timelike};
use rand::Rng;

const AIRLINES: &[&str] = &[
    "American Airlines",
    "United Airlines",
    "Delta Airlines",
    "Southwest",
    "JetBlue",
    "Alaska Airlines",
];

/// Today's date in the form the backend expects
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

pub fn generate_mock_flights(from: &str, to: &str, date: &str) -> Vec<Flight> {
    generate_mock_flights_with(&mut rand::thread_rng(), from, to, date)
}

/// 6 to 10 flights departing 06:00-21:45 on quarter hours, sorted by departure.
///
/// `date` only labels the search; times are wall-clock and wrap past midnight.
pub fn generate_mock_flights_with<R: Rng>(rng: &mut R, from: &str, to: &str, date: &str) -> Vec<Flight> {
    let count: usize = rng.gen_range(6..=10);
    tracing::debug!(from, to, date, count, "Generating mock flights");

    let mut flights: Vec<Flight> = (0..count)
        .map(|i| {
            let depart_hour = rng.gen_range(6..22);
            let depart_minute = rng.gen_range(0..4) * 15;
            let duration_minutes: u32 = rng.gen_range(120..300);

            // 06:00..21:45 is always a valid time
            let depart = NaiveTime::from_hms_opt(depart_hour, depart_minute, 0).unwrap_or_default();
            let arrive_minutes = (depart.hour() * 60 + depart.minute() + duration_minutes) % (24 * 60);
            let arrive = NaiveTime::from_hms_opt(arrive_minutes / 60, arrive_minutes % 60, 0).unwrap_or_default();

            let stops: u32 = if rng.gen_bool(0.4) { 0 } else { rng.gen_range(1..=2) };
            let base_price: u32 = rng.gen_range(150..550);
            // Direct flights cost more
            let price = base_price as f64 - 50.0 * stops as f64;

            Flight {
                id: format!("mock-{}", i),
                airline: AIRLINES[rng.gen_range(0..AIRLINES.len())].to_string(),
                depart_time: depart.format("%H:%M").to_string(),
                arrive_time: arrive.format("%H:%M").to_string(),
                depart_code: from.to_string(),
                arrive_code: to.to_string(),
                duration: format_duration(duration_minutes),
                stops: match stops {
                    0 => "Direct".to_string(),
                    1 => "1 stop".to_string(),
                    n => format!("{} stops", n),
                },
                price,
            }
        })
        .collect();

    flights.sort_by(|a, b| a.depart_time.cmp(&b.depart_time));
    flights
}
