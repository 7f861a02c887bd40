use serde::{Deserialize, Serialize};
use skybook_catalog::{PricingEngine, Quote, SeatMap};
use skybook_core::{BookingContext, Flight, PassengerCount, SearchQuery, Seat, User};
use skybook_shared::Notice;
use tracing::warn;

use crate::context::{BookingContextDraft, ContextError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", content = "seat_id", rename_all = "snake_case")]
pub enum SelectionChange {
    Selected(String),
    Deselected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Seat {0} does not exist on this aircraft")]
    UnknownSeat(String),

    #[error("Seat {0} is not available")]
    Unavailable(String),

    #[error("Already selected {passengers} seat(s)")]
    LimitReached { passengers: u8 },

    #[error("Selected {selected} of {required} seat(s)")]
    Incomplete { selected: usize, required: u8 },

    #[error("Login required to continue")]
    NotAuthenticated,

    #[error("Invalid booking context: {0}")]
    Context(#[from] ContextError),
}

impl SelectionError {
    pub fn notice(&self) -> Notice {
        match self {
            SelectionError::LimitReached { passengers } => Notice::new(
                "Maximum seats selected",
                format!("You can only select {} seat(s) for your booking.", passengers),
            ),
            SelectionError::Incomplete { required, .. } => Notice::new(
                "Please select seats",
                format!("Please select {} seat(s) to continue.", required),
            ),
            SelectionError::NotAuthenticated => {
                Notice::new("Please login", "You need to login to complete your booking.")
            }
            SelectionError::Context(e) => Notice::new("Booking details invalid", e.to_string()),
            other => Notice::new("Seat unavailable", other.to_string()),
        }
    }

    /// Where the client should be sent, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            SelectionError::NotAuthenticated => Some("/login"),
            SelectionError::Context(e) => e.redirect(),
            _ => None,
        }
    }
}

/// Seat-selection stage state: one generated seat map plus the seats
/// picked so far, never more than the passenger count.
#[derive(Debug, Clone)]
pub struct SeatSelection {
    flight: Flight,
    passengers: PassengerCount,
    search: Option<SearchQuery>,
    seat_map: SeatMap,
    selected: Vec<String>,
    pricing: PricingEngine,
}

/// Snapshot rendered by the seat-selection page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionView {
    pub flight: Flight,
    pub passengers: PassengerCount,
    pub seat_map: SeatMap,
    pub selected: Vec<String>,
    pub quote: Quote,
    pub can_continue: bool,
}

impl SeatSelection {
    pub fn new(flight: Flight, passengers: PassengerCount, search: Option<SearchQuery>, seat_map: SeatMap) -> Self {
        Self {
            flight,
            passengers,
            search,
            seat_map,
            selected: Vec::new(),
            pricing: PricingEngine::new(),
        }
    }

    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    pub fn passengers(&self) -> PassengerCount {
        self.passengers
    }

    pub fn seat_map(&self) -> &SeatMap {
        &self.seat_map
    }

    /// Selected seat ids in the order they were picked.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.selected.iter().any(|id| id == seat_id)
    }

    pub fn is_complete(&self) -> bool {
        self.selected.len() == self.passengers.as_usize()
    }

    /// Select or deselect one seat. A rejected toggle leaves the selection
    /// untouched.
    pub fn toggle(&mut self, seat_id: &str) -> Result<SelectionChange, SelectionError> {
        let seat = self
            .seat_map
            .get(seat_id)
            .ok_or_else(|| SelectionError::UnknownSeat(seat_id.to_string()))?;

        if !seat.is_available {
            return Err(SelectionError::Unavailable(seat_id.to_string()));
        }

        if let Some(pos) = self.selected.iter().position(|id| id == seat_id) {
            self.selected.remove(pos);
            return Ok(SelectionChange::Deselected(seat_id.to_string()));
        }

        if self.selected.len() >= self.passengers.as_usize() {
            warn!(
                "Seat {} rejected on flight {}: {} already selected",
                seat_id,
                self.flight.id,
                self.selected.len()
            );
            return Err(SelectionError::LimitReached {
                passengers: self.passengers.get(),
            });
        }

        self.selected.push(seat_id.to_string());
        Ok(SelectionChange::Selected(seat_id.to_string()))
    }

    pub fn selected_seats(&self) -> Vec<Seat> {
        self.selected
            .iter()
            .filter_map(|id| self.seat_map.get(id))
            .cloned()
            .collect()
    }

    pub fn quote(&self) -> Quote {
        let seats = self.selected.iter().filter_map(|id| self.seat_map.get(id));
        self.pricing.quote(self.flight.price, self.passengers, seats)
    }

    /// Gate into the confirmation stage: the selection must be complete and
    /// someone must be signed in.
    pub fn continue_to_booking(&self, user: Option<&User>) -> Result<BookingContext, SelectionError> {
        if !self.is_complete() {
            return Err(SelectionError::Incomplete {
                selected: self.selected.len(),
                required: self.passengers.get(),
            });
        }

        if user.is_none() {
            return Err(SelectionError::NotAuthenticated);
        }

        let draft = BookingContextDraft {
            flight: Some(self.flight.clone()),
            passengers: Some(self.passengers),
            seats: Some(self.selected_seats()),
            total_price: Some(self.quote().total),
            search: self.search.clone(),
        };
        Ok(draft.validate(&self.pricing)?)
    }

    pub fn view(&self) -> SelectionView {
        SelectionView {
            flight: self.flight.clone(),
            passengers: self.passengers,
            seat_map: self.seat_map.clone(),
            selected: self.selected.clone(),
            quote: self.quote(),
            can_continue: self.is_complete(),
        }
    }
}
