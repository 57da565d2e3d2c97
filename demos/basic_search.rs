//! Basic flight search example
//!
//! Reads the backend settings from the environment (`ROUTEWISE_API_URL`,
//! `ROUTEWISE_USE_MOCK_DATA=true` to run offline).

use routewise::display::render_flight_card;
use routewise::params::{Endpoint, SearchField};
use routewise::{find_airport, search_flights, AppConfig, FlightError, SearchFormController, TripType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let mut form = SearchFormController::new();
    form.set_trip_type(TripType::OneWay);
    if let (Some(origin), Some(destination)) = (find_airport("LHR"), find_airport("JFK")) {
        form.select_airport(Endpoint::Origin, origin);
        form.select_airport(Endpoint::Destination, destination);
    }
    form.update(SearchField::DepartDate("2025-08-15".to_string()));

    println!("Searching for flights from LHR to JFK on 2025-08-15...");
    match search_flights(&config, &mut form).await {
        Ok(flights) => {
            println!("✅ Search completed successfully!");
            println!("Found {} flights", flights.len());

            for (i, flight) in flights.iter().take(3).enumerate() {
                println!("\n--- Flight {} ---", i + 1);
                println!("{}", render_flight_card(flight));
            }
        }
        Err(FlightError::Validation(errors)) => {
            eprintln!("❌ The search form is incomplete:");
            for error in errors {
                eprintln!("  - {}", error);
            }
        }
        Err(e) => {
            eprintln!("❌ Error searching for flights: {}", e);
            eprintln!("Set ROUTEWISE_USE_MOCK_DATA=true to try it without a backend.");
        }
    }

    Ok(())
}
