use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skybook_core::repository::FlightRepository;
use skybook_core::{BoxError, Flight, PassengerCount, SearchQuery};

use crate::flights::airport_city;

/// What to show when no catalog entry matches the requested route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "size", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Show the first `n` catalog entries instead of an empty page.
    FirstN(usize),
    Empty,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::FirstN(2)
    }
}

/// Header line of the results page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSummary {
    pub origin_city: String,
    pub destination_city: String,
    pub departure: NaiveDate,
    pub passengers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultsListing {
    pub query: SearchQuery,
    pub summary: ListingSummary,
    pub flights: Vec<Flight>,
    /// Set when `flights` came from the fallback policy rather than a route match.
    pub is_fallback: bool,
}

impl ResultsListing {
    /// Filter `catalog` down to the query's route, applying `policy` when
    /// nothing matches.
    pub fn build(query: SearchQuery, catalog: Vec<Flight>, policy: FallbackPolicy) -> Self {
        let matches: Vec<Flight> = catalog
            .iter()
            .filter(|f| f.serves(&query.from, &query.to))
            .cloned()
            .collect();

        let (flights, is_fallback) = if !matches.is_empty() {
            (matches, false)
        } else {
            match policy {
                FallbackPolicy::FirstN(n) => (catalog.into_iter().take(n).collect(), true),
                FallbackPolicy::Empty => (Vec::new(), false),
            }
        };

        if is_fallback {
            tracing::debug!(
                "No flights for {} -> {}, showing {} fallback entries",
                query.from,
                query.to,
                flights.len()
            );
        }

        let summary = ListingSummary {
            origin_city: airport_city(&query.from),
            destination_city: airport_city(&query.to),
            departure: query.departure,
            passengers: query.passengers.label(),
        };

        Self {
            query,
            summary,
            flights,
            is_fallback,
        }
    }

    /// Run `query` against a repository.
    pub async fn search(
        repo: &dyn FlightRepository,
        query: SearchQuery,
        policy: FallbackPolicy,
    ) -> Result<Self, BoxError> {
        let catalog = repo.list_flights().await?;
        Ok(Self::build(query, catalog, policy))
    }

    pub fn find(&self, flight_id: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.id == flight_id)
    }

    pub fn passengers(&self) -> PassengerCount {
        self.query.passengers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::MockFlightCatalog;
    use skybook_core::TripType;

    fn query(from: &str, to: &str, passengers: u8) -> SearchQuery {
        SearchQuery {
            from: from.to_string(),
            to: to.to_string(),
            departure: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
            passengers: PassengerCount::new(passengers).unwrap(),
            trip_type: TripType::OneWay,
            return_date: None,
        }
    }

    #[tokio::test]
    async fn test_exact_route_match() {
        let catalog = MockFlightCatalog::new();
        let listing = ResultsListing::search(&catalog, query("JFK", "LAX", 2), FallbackPolicy::default())
            .await
            .unwrap();

        assert!(!listing.is_fallback);
        let ids: Vec<&str> = listing.flights.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["FL001", "FL002"]);
        assert_eq!(listing.summary.origin_city, "New York");
        assert_eq!(listing.summary.destination_city, "Los Angeles");
        assert_eq!(listing.summary.passengers, "2 Passengers");
        assert!(listing.find("FL003").is_none());
    }

    #[tokio::test]
    async fn test_no_match_uses_fallback_subset() {
        let catalog = MockFlightCatalog::new();
        let listing = ResultsListing::search(&catalog, query("ORD", "MIA", 1), FallbackPolicy::default())
            .await
            .unwrap();

        assert!(listing.is_fallback);
        assert_eq!(listing.flights.len(), 2);
        assert_eq!(listing.flights[0].id, "FL001");
    }

    #[tokio::test]
    async fn test_empty_policy_returns_nothing() {
        let catalog = MockFlightCatalog::new();
        let listing = ResultsListing::search(&catalog, query("ORD", "MIA", 1), FallbackPolicy::Empty)
            .await
            .unwrap();

        assert!(listing.flights.is_empty());
        assert!(!listing.is_fallback);
    }

    #[test]
    fn test_reverse_route_matches_only_return_flight() {
        let listing = ResultsListing::build(
            query("LAX", "JFK", 1),
            crate::flights::flights(),
            FallbackPolicy::default(),
        );
        assert_eq!(listing.flights.len(), 1);
        assert_eq!(listing.flights[0].id, "FL003");
    }
}
