//! Text rendering of flight cards and the filters sidebar

use crate::filter::{FilterState, StopCategory, TimePeriod};
use crate::Flight;
use chrono::NaiveDate;
use std::fmt::Write;

/// "2025-06-01" -> "Sun 1 Jun". Unparseable input is returned as is.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%a %-d %b").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Whole pounds with thousands separators, e.g. "£1,299"
pub fn format_price(price: f64) -> String {
    let whole = price.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("£{}", grouped)
}

pub fn render_flight_card(flight: &Flight) -> String {
    let direct = flight.stops.to_lowercase().contains("direct");
    let route_marker = if direct { "──✈──" } else { "──•──" };
    format!(
        "{airline}\n  {depart} {from} {marker} {arrive} {to}\n  {duration} · {stops}\n  {price}",
        airline = flight.airline,
        depart = flight.depart_time,
        from = flight.depart_code,
        marker = route_marker,
        arrive = flight.arrive_time,
        to = flight.arrive_code,
        duration = flight.duration,
        stops = flight.stops,
        price = format_price(flight.price),
    )
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Sidebar with every option and its current selection
pub fn render_filters_sidebar(filters: &FilterState, available_airlines: &[String], max_price: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Price: up to {} (max {})",
        format_price(filters.price_range.1),
        format_price(max_price)
    );

    let _ = writeln!(out, "Stops:");
    for stop in StopCategory::ALL {
        let _ = writeln!(out, "  {} {}", checkbox(filters.stops.contains(&stop)), stop.label());
    }

    if !available_airlines.is_empty() {
        let _ = writeln!(out, "Airlines:");
        for airline in available_airlines {
            let _ = writeln!(out, "  {} {}", checkbox(filters.airlines.contains(airline)), airline);
        }
    }

    let _ = writeln!(out, "Departure time:");
    for period in TimePeriod::ALL {
        let _ = writeln!(
            out,
            "  {} {} ({})",
            checkbox(filters.departure_times.contains(&period)),
            period.label(),
            period.time_range()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterChange;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-06-01"), "Sun 1 Jun");
        assert_eq!(format_date("next week"), "next week");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1299.0), "£1,299");
        assert_eq!(format_price(99.6), "£100");
        assert_eq!(format_price(1234567.0), "£1,234,567");
        assert_eq!(format_price(0.0), "£0");
    }

    #[test]
    fn test_flight_card_mentions_route_and_price() {
        let card = render_flight_card(&Flight {
            id: "v2-0".to_string(),
            airline: "Multiple Airlines".to_string(),
            depart_time: "09:15".to_string(),
            arrive_time: "12:30".to_string(),
            depart_code: "LHR".to_string(),
            arrive_code: "JFK".to_string(),
            duration: "8h 15m".to_string(),
            stops: "1 stop".to_string(),
            price: 512.0,
        });
        assert!(card.starts_with("Multiple Airlines"));
        assert!(card.contains("09:15 LHR"));
        assert!(card.contains("12:30 JFK"));
        assert!(card.contains("8h 15m · 1 stop"));
        assert!(card.contains("£512"));
    }

    #[test]
    fn test_sidebar_marks_selected_options() {
        let mut filters = FilterState::with_max_price(800.0);
        filters.apply_change(FilterChange::ToggleStop(StopCategory::Direct));
        filters.apply_change(FilterChange::ToggleAirline("JetBlue".to_string()));
        let sidebar = render_filters_sidebar(&filters, &["JetBlue".to_string(), "Delta".to_string()], 800.0);
        assert!(sidebar.contains("[x] Direct"));
        assert!(sidebar.contains("[ ] 1 stop"));
        assert!(sidebar.contains("[x] JetBlue"));
        assert!(sidebar.contains("[ ] Delta"));
        assert!(sidebar.contains("[ ] Night (12AM - 6AM)"));
    }

    #[test]
    fn test_sidebar_hides_airlines_when_none_known() {
        let sidebar = render_filters_sidebar(&FilterState::default(), &[], 2000.0);
        assert!(!sidebar.contains("Airlines:"));
    }
}
