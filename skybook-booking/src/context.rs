use serde::Deserialize;
use skybook_catalog::{PricingEngine, SeatGenerator};
use skybook_core::{BookingContext, Flight, PassengerCount, SearchQuery, Seat};
use std::collections::HashSet;

/// Booking context as it arrives at a stage boundary: every field optional
/// until [`BookingContextDraft::validate`] says otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingContextDraft {
    pub flight: Option<Flight>,
    pub passengers: Option<PassengerCount>,
    pub seats: Option<Vec<Seat>>,
    pub total_price: Option<i32>,
    pub search: Option<SearchQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("No flight in booking context")]
    MissingFlight,

    #[error("Flight {0} is not in the catalog")]
    UnknownFlight(String),

    #[error("Seat {0} does not exist on this aircraft")]
    UnknownSeat(String),

    #[error("No passenger count in booking context")]
    MissingPassengers,

    #[error("Expected {expected} seat(s), got {actual}")]
    SeatCountMismatch { expected: u8, actual: usize },

    #[error("Seat {0} is listed more than once")]
    DuplicateSeat(String),

    #[error("Seat {0} is not available")]
    UnavailableSeat(String),

    #[error("Total price {actual} does not match quote {expected}")]
    PriceMismatch { expected: i32, actual: i32 },
}

impl ContextError {
    /// A context without a flight means the page was reached directly;
    /// the client goes back to the search page without a notice.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            ContextError::MissingFlight => Some("/"),
            _ => None,
        }
    }
}

impl BookingContextDraft {
    /// Id of the flight the client claims to be booking.
    pub fn flight_id(&self) -> Option<&str> {
        self.flight.as_ref().map(|f| f.id.as_str())
    }

    /// Replace client-supplied flight and seat details with the catalog's.
    ///
    /// `flight` must be the catalog entry for [`Self::flight_id`]. Each seat
    /// is rebuilt from `layout` by id, so fare, class and upcharge cannot be
    /// chosen by the caller. A seat the client already marked taken stays
    /// taken.
    pub fn reconcile(mut self, flight: Flight, layout: &SeatGenerator) -> Result<Self, ContextError> {
        match self.flight_id() {
            None => return Err(ContextError::MissingFlight),
            Some(id) if id != flight.id => return Err(ContextError::UnknownFlight(id.to_string())),
            Some(_) => {}
        }

        if let Some(seats) = self.seats.take() {
            let rebuilt = seats
                .into_iter()
                .map(|claimed| {
                    let mut seat = layout
                        .layout_seat(&claimed.id)
                        .ok_or_else(|| ContextError::UnknownSeat(claimed.id.clone()))?;
                    seat.is_available = claimed.is_available;
                    Ok(seat)
                })
                .collect::<Result<Vec<Seat>, ContextError>>()?;
            self.seats = Some(rebuilt);
        }

        self.flight = Some(flight);
        Ok(self)
    }

    pub fn validate(self, pricing: &PricingEngine) -> Result<BookingContext, ContextError> {
        let flight = self.flight.ok_or(ContextError::MissingFlight)?;
        let passengers = self.passengers.ok_or(ContextError::MissingPassengers)?;
        let seats = self.seats.unwrap_or_default();

        if seats.len() != passengers.as_usize() {
            return Err(ContextError::SeatCountMismatch {
                expected: passengers.get(),
                actual: seats.len(),
            });
        }

        let mut seen = HashSet::new();
        for seat in &seats {
            if !seen.insert(seat.id.as_str()) {
                return Err(ContextError::DuplicateSeat(seat.id.clone()));
            }
            if !seat.is_available {
                return Err(ContextError::UnavailableSeat(seat.id.clone()));
            }
        }

        let expected = pricing.quote(flight.price, passengers, &seats).total;
        let total_price = match self.total_price {
            Some(actual) if actual != expected => {
                return Err(ContextError::PriceMismatch { expected, actual });
            }
            _ => expected,
        };

        Ok(BookingContext {
            flight,
            passengers,
            seats,
            total_price,
            search: self.search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybook_catalog::flights::flights;
    use skybook_core::SeatClass;

    fn draft() -> BookingContextDraft {
        BookingContextDraft {
            flight: Some(flights()[2].clone()),
            passengers: Some(PassengerCount::new(2).unwrap()),
            seats: Some(vec![
                Seat::new(4, 'A', SeatClass::Business, true, Some(75)),
                Seat::new(30, 'F', SeatClass::Economy, true, None),
            ]),
            total_price: None,
            search: None,
        }
    }

    #[test]
    fn test_missing_flight_redirects_home() {
        let err = BookingContextDraft::default()
            .validate(&PricingEngine::new())
            .unwrap_err();
        assert_eq!(err, ContextError::MissingFlight);
        assert_eq!(err.redirect(), Some("/"));
    }

    #[test]
    fn test_total_is_computed_when_absent() {
        let context = draft().validate(&PricingEngine::new()).unwrap();
        assert_eq!(context.total_price, 275 * 2 + 75);
    }

    #[test]
    fn test_tampered_total_rejected() {
        let mut draft = draft();
        draft.total_price = Some(1);
        assert_eq!(
            draft.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::PriceMismatch { expected: 625, actual: 1 }
        );
    }

    #[test]
    fn test_seat_count_must_match_passengers() {
        let mut draft = draft();
        draft.passengers = Some(PassengerCount::new(3).unwrap());
        assert_eq!(
            draft.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::SeatCountMismatch { expected: 3, actual: 2 }
        );
    }

    #[test]
    fn test_duplicate_seat_rejected() {
        let mut draft = draft();
        draft.seats = Some(vec![
            Seat::new(30, 'F', SeatClass::Economy, true, None),
            Seat::new(30, 'F', SeatClass::Economy, true, None),
        ]);
        assert_eq!(
            draft.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::DuplicateSeat("30F".to_string())
        );
    }

    #[test]
    fn test_missing_passengers_rejected() {
        let mut draft = draft();
        draft.passengers = None;
        assert_eq!(
            draft.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::MissingPassengers
        );
    }

    #[test]
    fn test_unavailable_seat_rejected() {
        let mut draft = draft();
        draft.seats = Some(vec![
            Seat::new(4, 'A', SeatClass::Business, true, Some(75)),
            Seat::new(30, 'F', SeatClass::Economy, false, None),
        ]);
        assert_eq!(
            draft.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::UnavailableSeat("30F".to_string())
        );
    }

    #[test]
    fn test_reconcile_reprices_from_catalog() {
        let catalog = flights()[0].clone();
        let mut tampered = catalog.clone();
        tampered.price = 1;

        let draft = BookingContextDraft {
            flight: Some(tampered),
            passengers: Some(PassengerCount::new(1).unwrap()),
            seats: Some(vec![Seat::new(1, 'A', SeatClass::Economy, true, None)]),
            total_price: Some(1),
            search: None,
        };

        let reconciled = draft.reconcile(catalog, &SeatGenerator::default()).unwrap();
        let seat = &reconciled.seats.as_ref().unwrap()[0];
        assert_eq!(seat.class, SeatClass::First);
        assert_eq!(seat.upcharge, Some(150));
        assert_eq!(
            reconciled.validate(&PricingEngine::new()).unwrap_err(),
            ContextError::PriceMismatch { expected: 299 + 150, actual: 1 }
        );
    }

    #[test]
    fn test_reconcile_keeps_honest_total() {
        let catalog = flights()[0].clone();
        let draft = BookingContextDraft {
            flight: Some(catalog.clone()),
            passengers: Some(PassengerCount::new(1).unwrap()),
            seats: Some(vec![Seat::new(20, 'C', SeatClass::Economy, true, None)]),
            total_price: Some(299),
            search: None,
        };

        let context = draft
            .reconcile(catalog, &SeatGenerator::default())
            .unwrap()
            .validate(&PricingEngine::new())
            .unwrap();
        assert_eq!(context.total_price, 299);
    }

    #[test]
    fn test_reconcile_rejects_seat_outside_layout() {
        let catalog = flights()[0].clone();
        let mut draft = draft();
        draft.flight = Some(catalog.clone());
        draft.seats = Some(vec![
            Seat::new(4, 'A', SeatClass::Business, true, Some(75)),
            Seat::new(3, 'E', SeatClass::First, true, Some(150)),
        ]);

        assert_eq!(
            draft.reconcile(catalog, &SeatGenerator::default()).unwrap_err(),
            ContextError::UnknownSeat("3E".to_string())
        );
    }

    #[test]
    fn test_reconcile_rejects_other_flight() {
        let err = draft()
            .reconcile(flights()[0].clone(), &SeatGenerator::default())
            .unwrap_err();
        assert_eq!(err, ContextError::UnknownFlight("FL003".to_string()));
    }

    #[test]
    fn test_draft_deserializes_with_missing_fields() {
        let draft: BookingContextDraft = serde_json::from_str(r#"{"passengers": 1}"#).unwrap();
        assert!(draft.flight.is_none());
        assert_eq!(draft.passengers.unwrap().get(), 1);
    }
}
