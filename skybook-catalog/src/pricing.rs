use serde::{Deserialize, Serialize};
use skybook_core::{PassengerCount, Seat};

/// Price breakdown shown in the booking summary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    /// Fare times passenger count
    pub fare_total: i32,
    /// Sum of seat upcharges
    pub seat_total: i32,
    pub total: i32,
}

/// Booking price calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// total = fare × passengers + Σ upcharge (seats without one add 0)
    pub fn quote<'a, I>(&self, fare: i32, passengers: PassengerCount, seats: I) -> Quote
    where
        I: IntoIterator<Item = &'a Seat>,
    {
        let fare_total = fare.saturating_mul(passengers.get() as i32);
        let seat_total = seats
            .into_iter()
            .fold(0i32, |acc, seat| acc.saturating_add(seat.upcharge_amount()));

        Quote {
            fare_total,
            seat_total,
            total: fare_total.saturating_add(seat_total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybook_core::SeatClass;

    #[test]
    fn test_quote_adds_upcharges() {
        let engine = PricingEngine::new();
        let seats = vec![
            Seat::new(1, 'A', SeatClass::First, true, Some(150)),
            Seat::new(5, 'C', SeatClass::Business, true, Some(75)),
            Seat::new(20, 'F', SeatClass::Economy, true, None),
        ];

        let quote = engine.quote(299, PassengerCount::new(3).unwrap(), &seats);
        assert_eq!(quote.fare_total, 897);
        assert_eq!(quote.seat_total, 225);
        assert_eq!(quote.total, 1122);
    }

    #[test]
    fn test_quote_without_seats_is_fare_only() {
        let quote = PricingEngine::new().quote(350, PassengerCount::new(2).unwrap(), std::iter::empty::<&Seat>());
        assert_eq!(quote, Quote { fare_total: 700, seat_total: 0, total: 700 });
    }
}
