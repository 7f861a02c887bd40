use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use skybook_core::repository::FlightRepository;
use skybook_core::{Airport, BoxError, Flight, FlightEndpoint};
use std::time::Duration;

const AIRPORTS: &[(&str, &str, &str)] = &[
    ("JFK", "John F. Kennedy International", "New York"),
    ("LAX", "Los Angeles International", "Los Angeles"),
    ("ORD", "O'Hare International", "Chicago"),
    ("MIA", "Miami International", "Miami"),
    ("SFO", "San Francisco International", "San Francisco"),
    ("DEN", "Denver International", "Denver"),
    ("SEA", "Seattle-Tacoma International", "Seattle"),
    ("LAS", "McCarran International", "Las Vegas"),
];

pub fn airports() -> Vec<Airport> {
    AIRPORTS
        .iter()
        .map(|(code, name, city)| Airport {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        })
        .collect()
}

/// City for an airport code; unknown codes are returned unchanged.
pub fn airport_city(code: &str) -> String {
    AIRPORTS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, city)| city.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn endpoint(code: &str, hour: u32, minute: u32, date: (i32, u32, u32)) -> FlightEndpoint {
    let (_, name, city) = AIRPORTS
        .iter()
        .find(|(c, _, _)| *c == code)
        .copied()
        .unwrap_or((code, code, code));

    FlightEndpoint {
        airport: name.to_string(),
        city: city.to_string(),
        code: code.to_string(),
        time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
    }
}

/// The fixed demo catalog.
pub fn flights() -> Vec<Flight> {
    vec![
        Flight {
            id: "FL001".to_string(),
            airline: "SkyWings Airlines".to_string(),
            flight_number: "SW 501".to_string(),
            departure: endpoint("JFK", 8, 30, (2024, 9, 15)),
            arrival: endpoint("LAX", 11, 45, (2024, 9, 15)),
            duration_minutes: 6 * 60 + 15,
            price: 299,
            currency: "USD".to_string(),
            aircraft: "Boeing 737-800".to_string(),
            available_seats: 45,
        },
        Flight {
            id: "FL002".to_string(),
            airline: "AeroJet".to_string(),
            flight_number: "AJ 203".to_string(),
            departure: endpoint("JFK", 14, 20, (2024, 9, 15)),
            arrival: endpoint("LAX", 17, 35, (2024, 9, 15)),
            duration_minutes: 6 * 60 + 15,
            price: 350,
            currency: "USD".to_string(),
            aircraft: "Airbus A320".to_string(),
            available_seats: 23,
        },
        Flight {
            id: "FL003".to_string(),
            airline: "CloudLine Airways".to_string(),
            flight_number: "CL 105".to_string(),
            departure: endpoint("LAX", 9, 15, (2024, 9, 16)),
            arrival: endpoint("JFK", 17, 30, (2024, 9, 16)),
            duration_minutes: 5 * 60 + 15,
            price: 275,
            currency: "USD".to_string(),
            aircraft: "Boeing 787".to_string(),
            available_seats: 67,
        },
    ]
}

/// In-memory catalog standing in for a flight inventory service.
///
/// `latency` is applied to every catalog read to mimic a network round trip.
pub struct MockFlightCatalog {
    flights: Vec<Flight>,
    airports: Vec<Airport>,
    latency: Duration,
}

impl MockFlightCatalog {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            flights: flights(),
            airports: airports(),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockFlightCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightRepository for MockFlightCatalog {
    async fn list_flights(&self) -> Result<Vec<Flight>, BoxError> {
        self.simulate_latency().await;
        Ok(self.flights.clone())
    }

    async fn get_flight(&self, id: &str) -> Result<Option<Flight>, BoxError> {
        Ok(self.flights.iter().find(|f| f.id == id).cloned())
    }

    async fn list_airports(&self) -> Result<Vec<Airport>, BoxError> {
        Ok(self.airports.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_contents() {
        let catalog = MockFlightCatalog::new();
        let flights = catalog.list_flights().await.unwrap();
        assert_eq!(flights.len(), 3);
        assert_eq!(flights[0].duration_label(), "6h 15m");
        assert_eq!(flights[2].departure.code, "LAX");
        assert_eq!(flights[2].arrival.city, "New York");

        assert_eq!(catalog.list_airports().await.unwrap().len(), 8);
        assert_eq!(catalog.get_flight("FL002").await.unwrap().unwrap().price, 350);
        assert!(catalog.get_flight("FL999").await.unwrap().is_none());
    }

    #[test]
    fn test_airport_city_falls_back_to_code() {
        assert_eq!(airport_city("ORD"), "Chicago");
        assert_eq!(airport_city("XYZ"), "XYZ");
    }
}
