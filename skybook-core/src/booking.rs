use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::flight::{Flight, Seat};
use crate::identity::User;
use crate::search::{PassengerCount, SearchQuery};
use crate::CoreResult;

/// Everything the confirmation stage needs. Serialize-only: client input
/// arrives as a draft and becomes a context through validation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookingContext {
    pub flight: Flight,
    pub passengers: PassengerCount,
    pub seats: Vec<Seat>,
    pub total_price: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchQuery>,
}

impl BookingContext {
    pub fn seat_ids(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingConfirmation {
    pub reference: String,
    pub flight_id: String,
    pub user_id: String,
    pub seats: Vec<String>,
    pub total_price: i32,
    pub currency: String,
    pub confirmed_at: DateTime<Utc>,
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Place the booking with the reservation backend.
    async fn submit(&self, context: &BookingContext, user: &User) -> CoreResult<BookingConfirmation>;
}

/// Reservation backend stand-in: waits `delay` and always confirms.
pub struct SimulatedBookingGateway {
    delay: Duration,
}

impl SimulatedBookingGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedBookingGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl BookingGateway for SimulatedBookingGateway {
    async fn submit(&self, context: &BookingContext, user: &User) -> CoreResult<BookingConfirmation> {
        tokio::time::sleep(self.delay).await;

        let reference = generate_reference(&mut rand::thread_rng());
        tracing::info!("Simulated booking {} for flight {}", reference, context.flight.id);

        Ok(BookingConfirmation {
            reference,
            flight_id: context.flight.id.clone(),
            user_id: user.id.clone(),
            seats: context.seat_ids(),
            total_price: context.total_price,
            currency: context.flight.currency.clone(),
            confirmed_at: Utc::now(),
        })
    }
}

const REFERENCE_PREFIX: &str = "SKY";
const REFERENCE_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `SKY` followed by nine uppercase base-36 characters.
pub fn generate_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..REFERENCE_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", REFERENCE_PREFIX, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::{FlightEndpoint, SeatClass};
    use chrono::{NaiveDate, NaiveTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn endpoint(code: &str) -> FlightEndpoint {
        FlightEndpoint {
            airport: format!("{} Airport", code),
            city: code.to_string(),
            code: code.to_string(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
        }
    }

    fn context() -> BookingContext {
        BookingContext {
            flight: Flight {
                id: "FL001".to_string(),
                airline: "SkyWings Airlines".to_string(),
                flight_number: "SW 501".to_string(),
                departure: endpoint("JFK"),
                arrival: endpoint("LAX"),
                duration_minutes: 375,
                price: 299,
                currency: "USD".to_string(),
                aircraft: "Boeing 737-800".to_string(),
                available_seats: 45,
            },
            passengers: PassengerCount::new(1).unwrap(),
            seats: vec![Seat::new(2, 'A', SeatClass::First, true, Some(150))],
            total_price: 449,
            search: None,
        }
    }

    #[test]
    fn test_reference_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let reference = generate_reference(&mut rng);
            assert_eq!(reference.len(), 12);
            assert!(reference.starts_with("SKY"));
            assert!(reference[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[tokio::test]
    async fn test_simulated_gateway_confirms() {
        let gateway = SimulatedBookingGateway::new(Duration::ZERO);
        let user = User {
            id: "user_1".to_string(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
        };

        let confirmation = gateway.submit(&context(), &user).await.unwrap();
        assert_eq!(confirmation.flight_id, "FL001");
        assert_eq!(confirmation.seats, vec!["2A".to_string()]);
        assert_eq!(confirmation.total_price, 449);
        assert_eq!(confirmation.user_id, "user_1");
    }
}
