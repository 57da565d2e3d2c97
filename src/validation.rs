//! Completeness checks run before a search is submitted

use crate::params::{DateSearchType, SearchParameters};
use crate::TripType;

/// Outcome of [`validate_search`]; errors are in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collect every applicable error; never stops at the first one.
pub fn validate_search(params: &SearchParameters, trip_type: TripType) -> ValidationReport {
    let mut errors = Vec::new();

    if params.origin.is_empty() || params.destination.is_empty() {
        errors.push("Please select both departure and arrival airports");
    }

    let roundtrip = trip_type == TripType::RoundTrip;

    if trip_type == TripType::MultiCity {
        if params.multi_city_legs.iter().any(|leg| !leg.is_complete()) {
            errors.push("Please complete all multi-city flight details");
        }
    } else {
        match params.date_search_type {
            DateSearchType::Specific => {
                if params.depart_date.is_empty() {
                    errors.push("Please select a departure date");
                }
                if roundtrip && params.return_date.is_empty() {
                    errors.push("Please select a return date for round trip");
                }
            }
            DateSearchType::FlexibleMonth => {
                if params.flexible_month.is_empty() || params.flexible_year.is_empty() {
                    errors.push("Please select both month and year for flexible search");
                }
            }
            DateSearchType::FlexibleDays => {
                if params.selected_departure_days.is_empty() {
                    errors.push("Please select at least one departure day");
                }
                if roundtrip && params.selected_return_days.is_empty() {
                    errors.push("Please select at least one return day");
                }
            }
            DateSearchType::Duration => {
                if params.trip_duration.is_empty() {
                    errors.push("Please specify trip duration");
                }
                if params.earliest_departure.is_empty() {
                    errors.push("Please select earliest departure date");
                }
            }
        }
    }

    ValidationReport {
        errors: errors.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{LegField, SearchField};
    use chrono::Weekday;

    fn with_route() -> SearchParameters {
        let mut params = SearchParameters::default();
        params.set_airport(crate::params::Endpoint::Origin, "LHR", "London (LHR)");
        params.set_airport(crate::params::Endpoint::Destination, "JFK", "New York (JFK)");
        params
    }

    #[test]
    fn test_empty_parameters_are_invalid_for_every_trip_type() {
        for trip_type in [TripType::OneWay, TripType::RoundTrip, TripType::MultiCity] {
            let report = validate_search(&SearchParameters::default(), trip_type);
            assert!(!report.is_valid());
            assert!(!report.errors.is_empty());
        }
    }

    #[test]
    fn test_specific_roundtrip_missing_both_dates() {
        let report = validate_search(&with_route(), TripType::RoundTrip);
        assert_eq!(
            report.errors,
            vec![
                "Please select a departure date".to_string(),
                "Please select a return date for round trip".to_string(),
            ]
        );
    }

    #[test]
    fn test_one_way_does_not_need_return_date() {
        let params = with_route().with_field(SearchField::DepartDate("2025-06-01".to_string()));
        assert!(validate_search(&params, TripType::OneWay).is_valid());
        assert!(!validate_search(&params, TripType::RoundTrip).is_valid());
    }

    #[test]
    fn test_missing_airports_collected_with_date_errors() {
        let report = validate_search(&SearchParameters::default(), TripType::OneWay);
        assert_eq!(
            report.errors,
            vec![
                "Please select both departure and arrival airports".to_string(),
                "Please select a departure date".to_string(),
            ]
        );
    }

    #[test]
    fn test_flexible_month_needs_month_and_year() {
        let mut params = with_route().with_field(SearchField::DateSearchType(DateSearchType::FlexibleMonth));
        params.set_field(SearchField::FlexibleMonth("6".to_string()));
        let report = validate_search(&params, TripType::RoundTrip);
        assert_eq!(report.errors, vec!["Please select both month and year for flexible search".to_string()]);

        params.set_field(SearchField::FlexibleYear("2025".to_string()));
        assert!(validate_search(&params, TripType::RoundTrip).is_valid());
    }

    #[test]
    fn test_flexible_days_return_only_required_for_roundtrip() {
        let mut params = with_route().with_field(SearchField::DateSearchType(DateSearchType::FlexibleDays));
        params.toggle_day(crate::params::DayKind::Departure, Weekday::Fri);
        assert!(validate_search(&params, TripType::OneWay).is_valid());
        assert_eq!(
            validate_search(&params, TripType::RoundTrip).errors,
            vec!["Please select at least one return day".to_string()]
        );
    }

    #[test]
    fn test_duration_mode() {
        let params = with_route().with_field(SearchField::DateSearchType(DateSearchType::Duration));
        assert_eq!(
            validate_search(&params, TripType::RoundTrip).errors,
            vec![
                "Please specify trip duration".to_string(),
                "Please select earliest departure date".to_string(),
            ]
        );
    }

    #[test]
    fn test_multi_city_ignores_date_mode_and_checks_legs() {
        let mut params = with_route();
        let report = validate_search(&params, TripType::MultiCity);
        assert_eq!(report.errors, vec!["Please complete all multi-city flight details".to_string()]);

        for (id, from, to, date) in [(1, "LHR", "CDG", "2025-06-01"), (2, "CDG", "FCO", "2025-06-05")] {
            params.update_leg(id, LegField::From(from.to_string()));
            params.update_leg(id, LegField::To(to.to_string()));
            params.update_leg(id, LegField::Date(date.to_string()));
        }
        assert!(validate_search(&params, TripType::MultiCity).is_valid());
    }

    #[test]
    fn test_same_origin_and_destination_is_accepted() {
        let mut params = with_route().with_field(SearchField::DepartDate("2025-06-01".to_string()));
        params.set_airport(crate::params::Endpoint::Destination, "LHR", "London (LHR)");
        assert!(validate_search(&params, TripType::OneWay).is_valid());
    }
}
