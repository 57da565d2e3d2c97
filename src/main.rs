//! CLI interface for routewise

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use routewise::display::{format_date, format_price, render_filters_sidebar, render_flight_card};
use routewise::form::LayoverBound;
use routewise::logging::init_logging;
use routewise::params::{parse_weekdays, Endpoint, LegField};
use routewise::{
    find_airport, AppConfig, DateSearchType, FilterChange, FlightClient, FlightError, ResultsView, SearchField,
    SearchFormController, SearchSession, SearchState, SortKey, StopCategory, StopsPreference, TimePeriod, TripType,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "routewise")]
#[command(about = "Search flights with fallback across backend API versions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights
    Search(SearchArgs),
    /// Look up airports by code, name, city or country
    Airports {
        /// Search text; empty lists every airport
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Origin airport code
    #[arg(short, long, default_value = "")]
    pub from: String,
    /// Destination airport code
    #[arg(short, long, default_value = "")]
    pub to: String,
    /// Trip type (one-way, roundtrip, multi-city)
    #[arg(long, default_value = "roundtrip")]
    pub trip_type: String,
    /// Date mode (specific, flexible-month, flexible-days, duration)
    #[arg(long, default_value = "specific")]
    pub date_mode: String,
    /// Departure date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Return date for round trips (YYYY-MM-DD)
    #[arg(short, long)]
    pub return_date: Option<String>,
    /// Month for flexible-month searches (1-12)
    #[arg(long)]
    pub month: Option<String>,
    /// Year for flexible-month searches
    #[arg(long)]
    pub year: Option<String>,
    /// Departure weekdays, comma-separated (e.g. Fri,Sat)
    #[arg(long)]
    pub depart_days: Option<String>,
    /// Return weekdays, comma-separated
    #[arg(long)]
    pub return_days: Option<String>,
    /// Trip length in days for duration searches
    #[arg(long)]
    pub duration: Option<String>,
    /// Earliest departure date for duration searches
    #[arg(long)]
    pub earliest: Option<String>,
    /// Number of travellers
    #[arg(long, default_value = "1")]
    pub travellers: String,
    /// Maximum number of stops (any, 0, 1, 2)
    #[arg(long, default_value = "any")]
    pub max_stops: String,
    /// Minimum layover, hours ("3" or "3h")
    #[arg(long)]
    pub min_layover: Option<String>,
    /// Maximum layover, hours
    #[arg(long)]
    pub max_layover: Option<String>,
    /// Preferred layover city, repeatable
    #[arg(long = "via")]
    pub via: Vec<String>,
    /// Maximum price sent to the backend
    #[arg(long)]
    pub max_price: Option<String>,
    /// Multi-city leg as FROM:TO:DATE, repeatable
    #[arg(long = "leg")]
    pub legs: Vec<String>,
    /// Only show these stop counts (direct, 1, 2+), comma-separated
    #[arg(long)]
    pub stops: Option<String>,
    /// Only show these airlines, comma-separated
    #[arg(long)]
    pub airlines: Option<String>,
    /// Only show these departure windows (morning, afternoon, evening, night), comma-separated
    #[arg(long)]
    pub times: Option<String>,
    /// Hide flights above this price
    #[arg(long)]
    pub price_cap: Option<f64>,
    /// Sort by price, duration, departure or stops
    #[arg(long, default_value = "price")]
    pub sort: String,
    /// Output file for JSON results
    #[arg(short, long)]
    pub output: Option<String>,
    /// Use generated data instead of the backend
    #[arg(long)]
    pub mock: bool,
    /// Backend base URL
    #[arg(long)]
    pub api_url: Option<String>,
    /// Fall back to generated data when the backend is unreachable
    #[arg(long)]
    pub dev: bool,
    /// Request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn set_endpoint(form: &mut SearchFormController, endpoint: Endpoint, code: &str) {
    if code.is_empty() {
        return;
    }
    match find_airport(code) {
        Some(airport) => form.select_airport(endpoint, airport),
        None => {
            let code = code.to_uppercase();
            form.set_airport_text(endpoint, &code, &code);
        }
    }
}

fn parse_leg(raw: &str) -> Result<(String, String, String), FlightError> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [from, to, date] => Ok((from.to_uppercase(), to.to_uppercase(), date.to_string())),
        _ => Err(FlightError::ParseError(format!("Invalid leg (expected FROM:TO:DATE): {}", raw))),
    }
}

fn build_form(args: &SearchArgs) -> Result<SearchFormController, FlightError> {
    let mut form = SearchFormController::new();
    form.set_trip_type(args.trip_type.parse::<TripType>()?);
    set_endpoint(&mut form, Endpoint::Origin, &args.from);
    set_endpoint(&mut form, Endpoint::Destination, &args.to);

    form.update(SearchField::DateSearchType(args.date_mode.parse::<DateSearchType>()?));
    let text_fields: [(&Option<String>, fn(String) -> SearchField); 7] = [
        (&args.date, SearchField::DepartDate),
        (&args.return_date, SearchField::ReturnDate),
        (&args.month, SearchField::FlexibleMonth),
        (&args.year, SearchField::FlexibleYear),
        (&args.duration, SearchField::TripDuration),
        (&args.earliest, SearchField::EarliestDeparture),
        (&args.max_price, SearchField::MaxPrice),
    ];
    for (value, field) in text_fields {
        if let Some(value) = value {
            form.update(field(value.clone()));
        }
    }
    if let Some(days) = &args.depart_days {
        form.update(SearchField::DepartureDays(parse_weekdays(days)?));
    }
    if let Some(days) = &args.return_days {
        form.update(SearchField::ReturnDays(parse_weekdays(days)?));
    }

    form.update(SearchField::Travellers(args.travellers.clone()));
    form.update(SearchField::MaxStops(args.max_stops.parse::<StopsPreference>()?));
    if let Some(hours) = &args.min_layover {
        form.set_layover_bound(LayoverBound::Min, hours);
    }
    if let Some(hours) = &args.max_layover {
        form.set_layover_bound(LayoverBound::Max, hours);
    }
    for city in &args.via {
        form.add_layover_city(city);
    }

    let leg_ids: Vec<u32> = form.params().multi_city_legs.iter().map(|leg| leg.id).collect();
    for (i, raw) in args.legs.iter().enumerate() {
        let (from, to, date) = parse_leg(raw)?;
        let id = match leg_ids.get(i) {
            Some(id) => *id,
            None => form.add_leg(),
        };
        form.update_leg(id, LegField::From(from));
        form.update_leg(id, LegField::To(to));
        form.update_leg(id, LegField::Date(date));
    }
    Ok(form)
}

fn apply_result_filters(view: &mut ResultsView, args: &SearchArgs) -> Result<(), FlightError> {
    if let Some(stops) = &args.stops {
        for stop in split_list(stops) {
            view.apply_filter_change(FilterChange::ToggleStop(stop.parse::<StopCategory>()?));
        }
    }
    if let Some(airlines) = &args.airlines {
        for airline in split_list(airlines) {
            view.apply_filter_change(FilterChange::ToggleAirline(airline.to_string()));
        }
    }
    if let Some(times) = &args.times {
        for period in split_list(times) {
            view.apply_filter_change(FilterChange::ToggleDepartureTime(period.parse::<TimePeriod>()?));
        }
    }
    if let Some(cap) = args.price_cap {
        view.apply_filter_change(FilterChange::MaxPrice(cap));
    }
    view.set_sort_key(args.sort.parse::<SortKey>()?);
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ms) = args.timeout_ms {
        config.api_timeout = Duration::from_millis(ms);
    }
    config.use_mock_data |= args.mock;
    config.is_development |= args.dev;
    debug!(?config, "Effective configuration");

    let mut form = build_form(&args)?;
    let payload = match form.submit() {
        Ok(payload) => payload,
        Err(FlightError::Validation(errors)) => {
            eprintln!("Please fix the following:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let session = SearchSession::new(FlightClient::new(&config)?);
    let mut view = ResultsView::new(Some(payload));

    println!("Searching for flights...");
    if let Err(e) = view.load(&session).await {
        eprintln!("Error searching for flights: {}", e);
        std::process::exit(1);
    }
    if let SearchState::Error(message) = view.state() {
        eprintln!("{}", message);
        std::process::exit(1);
    }
    apply_result_filters(&mut view, &args)?;

    if let Some(params) = view.params() {
        let date = params.depart_date.as_deref().map(format_date).unwrap_or_default();
        println!("\n{} → {}  {}", params.from_display, params.to_display, date);
    }

    let visible = view.visible_flights();
    if let Some(output_file) = &args.output {
        let json = serde_json::to_string_pretty(&visible)?;
        fs::write(output_file, &json)?;
        println!("Results saved to {}", output_file);
    }

    println!("\n{}", render_filters_sidebar(view.filters(), &view.available_airlines(), view.max_price()));
    match view.empty_state() {
        Some(empty) => println!("{}", empty.message()),
        None => {
            for flight in &visible {
                println!("{}\n", render_flight_card(flight));
            }
        }
    }

    println!("Summary:");
    println!("Showing {} of {} flights", visible.len(), view.flights().len());
    if let Some(best) = visible.first() {
        println!("Top result: {} at {}", best.airline, format_price(best.price));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Search(args) => run_search(args).await?,
        Commands::Airports { query } => {
            let form = SearchFormController::new();
            let airports = form.airport_suggestions(&query);
            if airports.is_empty() {
                println!("No airports found");
            }
            for airport in airports {
                println!("{:<4} {} - {}, {}", airport.code, airport.name, airport.city, airport.country);
            }
        }
    }

    Ok(())
}
