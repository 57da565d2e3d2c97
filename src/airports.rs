//! Static airport directory backing origin/destination autocomplete

use serde::Serialize;

/// An airport in the seed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
}

impl Airport {
    const fn new(code: &'static str, name: &'static str, city: &'static str, country: &'static str) -> Self {
        Self { code, name, city, country }
    }

    /// Text shown in the input once the airport is picked, e.g. "London (LHR)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.city, self.code)
    }

    fn matches(&self, query_lower: &str) -> bool {
        [self.code, self.name, self.city, self.country]
            .iter()
            .any(|field| field.to_lowercase().contains(query_lower))
    }
}

pub static AIRPORTS: &[Airport] = &[
    Airport::new("JFK", "John F. Kennedy International", "New York", "USA"),
    Airport::new("LAX", "Los Angeles International", "Los Angeles", "USA"),
    Airport::new("LHR", "Heathrow", "London", "UK"),
    Airport::new("CDG", "Charles de Gaulle", "Paris", "France"),
    Airport::new("ORY", "Orly", "Paris", "France"),
    Airport::new("MAD", "Adolfo Suárez Madrid-Barajas", "Madrid", "Spain"),
    Airport::new("FCO", "Leonardo da Vinci-Fiumicino", "Rome", "Italy"),
    Airport::new("SFO", "San Francisco International", "San Francisco", "USA"),
    Airport::new("DXB", "Dubai International", "Dubai", "UAE"),
    Airport::new("SIN", "Singapore Changi", "Singapore", "Singapore"),
    Airport::new("HND", "Haneda", "Tokyo", "Japan"),
    Airport::new("SYD", "Sydney Kingsford Smith", "Sydney", "Australia"),
    Airport::new("ATH", "Athens International", "Athens", "Greece"),
    Airport::new("AMS", "Amsterdam Schiphol", "Amsterdam", "Netherlands"),
    Airport::new("BKK", "Suvarnabhumi", "Bangkok", "Thailand"),
    Airport::new("DEL", "Indira Gandhi International", "New Delhi", "India"),
    Airport::new("IST", "Istanbul Airport", "Istanbul", "Turkey"),
    Airport::new("MUC", "Munich Airport", "Munich", "Germany"),
    Airport::new("BCN", "Barcelona-El Prat", "Barcelona", "Spain"),
    Airport::new("MIA", "Miami International", "Miami", "USA"),
];

/// Case-insensitive substring match against code, name, city or country.
///
/// Results keep directory order. An empty query matches everything.
pub fn filter_airports(query: &str) -> Vec<&'static Airport> {
    let query_lower = query.trim().to_lowercase();
    AIRPORTS.iter().filter(|airport| airport.matches(&query_lower)).collect()
}

/// Exact (case-insensitive) lookup by IATA code
pub fn find_airport(code: &str) -> Option<&'static Airport> {
    let code = code.trim();
    AIRPORTS.iter().find(|airport| airport.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_city_returns_all_airports_in_city() {
        let codes: Vec<_> = filter_airports("paris").iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["CDG", "ORY"]);
    }

    #[test]
    fn test_filter_matches_code_name_and_country() {
        assert_eq!(filter_airports("lhr")[0].code, "LHR");
        assert_eq!(filter_airports("changi")[0].code, "SIN");
        let spain: Vec<_> = filter_airports("SPAIN").iter().map(|a| a.code).collect();
        assert_eq!(spain, vec!["MAD", "BCN"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        assert!(filter_airports("zzzz").is_empty());
    }

    #[test]
    fn test_empty_query_lists_directory() {
        assert_eq!(filter_airports("").len(), AIRPORTS.len());
    }

    #[test]
    fn test_find_airport_and_label() {
        let airport = find_airport("jfk").unwrap();
        assert_eq!(airport.label(), "New York (JFK)");
        assert!(find_airport("XXX").is_none());
    }
}
