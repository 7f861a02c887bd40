use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_catalog::{ResultsListing, SeatGenerator};
use skybook_core::{BookingConfirmation, BookingContext, SearchForm, SearchQuery, User};
use std::fmt;
use uuid::Uuid;

use crate::selection::{SeatSelection, SelectionChange, SelectionError};

/// Stage names, in flow order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    Search,
    Results,
    SeatSelection,
    Confirmation,
    Confirmed,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Search => "SEARCH",
            StageKind::Results => "RESULTS",
            StageKind::SeatSelection => "SEAT_SELECTION",
            StageKind::Confirmation => "CONFIRMATION",
            StageKind::Confirmed => "CONFIRMED",
        };
        f.write_str(name)
    }
}

/// The current stage together with the data it was entered with.
#[derive(Debug, Clone)]
pub enum Stage {
    Search,
    Results(ResultsListing),
    SeatSelection(SeatSelection),
    Confirmation(BookingContext),
    Confirmed {
        context: BookingContext,
        confirmation: BookingConfirmation,
    },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Search => StageKind::Search,
            Stage::Results(_) => StageKind::Results,
            Stage::SeatSelection(_) => StageKind::SeatSelection,
            Stage::Confirmation(_) => StageKind::Confirmation,
            Stage::Confirmed { .. } => StageKind::Confirmed,
        }
    }
}

/// Handed out when a slow operation starts; only the latest ticket can
/// complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTicket {
    epoch: u64,
}

impl FlowTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Booking flow not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid stage transition from {from} to {to}")]
    InvalidTransition { from: StageKind, to: StageKind },

    #[error("Result for epoch {ticket} superseded by epoch {current}")]
    Stale { ticket: u64, current: u64 },

    #[error("A booking request is already in flight")]
    Busy,

    #[error("Flight {0} is not in the current results")]
    UnknownFlight(String),

    #[error("Search rejected: {0}")]
    Search(#[from] skybook_core::CoreError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// One pass through search, results, seat selection and confirmation.
///
/// Every navigation bumps `epoch`. Slow operations (search, booking) are
/// split into `begin_*` and `complete_*` so the caller can release its lock
/// while waiting; a completion carrying an old ticket is refused instead of
/// overwriting newer state.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    id: Uuid,
    stage: Stage,
    epoch: u64,
    booking_in_flight: bool,
    pending_search: Option<SearchQuery>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingFlow {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Search,
            epoch: 0,
            booking_in_flight: false,
            pending_search: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_searching(&self) -> bool {
        self.pending_search.is_some()
    }

    pub fn is_booking(&self) -> bool {
        self.booking_in_flight
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Navigate back to an empty search. Allowed from any stage and
    /// invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.booking_in_flight = false;
        self.pending_search = None;
        self.enter(Stage::Search);
    }

    /// Validate the form and start a search. A newer search supersedes an
    /// older one still in flight.
    pub fn begin_search(&mut self, form: &SearchForm) -> Result<(FlowTicket, SearchQuery), FlowError> {
        match self.kind() {
            StageKind::Confirmed => {
                return Err(FlowError::InvalidTransition {
                    from: StageKind::Confirmed,
                    to: StageKind::Results,
                })
            }
            StageKind::Confirmation if self.booking_in_flight => return Err(FlowError::Busy),
            _ => {}
        }

        let query = form.submit()?;
        self.booking_in_flight = false;
        self.enter(Stage::Search);
        self.pending_search = Some(query.clone());
        Ok((self.ticket(), query))
    }

    pub fn complete_search(&mut self, ticket: FlowTicket, listing: ResultsListing) -> Result<&ResultsListing, FlowError> {
        self.check_ticket(ticket)?;
        if self.pending_search.take().is_none() {
            return Err(self.invalid(StageKind::Results));
        }

        self.enter(Stage::Results(listing));
        match &self.stage {
            Stage::Results(listing) => Ok(listing),
            _ => Err(self.invalid(StageKind::Results)),
        }
    }

    /// Pick a flight from the current results and open a fresh seat map.
    pub fn select_flight(&mut self, flight_id: &str, generator: &SeatGenerator) -> Result<&SeatSelection, FlowError> {
        let Stage::Results(listing) = &self.stage else {
            return Err(self.invalid(StageKind::SeatSelection));
        };

        let flight = listing
            .find(flight_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownFlight(flight_id.to_string()))?;
        let selection = SeatSelection::new(
            flight,
            listing.passengers(),
            Some(listing.query.clone()),
            generator.generate(),
        );

        self.enter(Stage::SeatSelection(selection));
        self.selection()
    }

    pub fn toggle_seat(&mut self, seat_id: &str) -> Result<SelectionChange, FlowError> {
        let from = self.kind();
        let Stage::SeatSelection(selection) = &mut self.stage else {
            return Err(FlowError::InvalidTransition {
                from,
                to: StageKind::SeatSelection,
            });
        };
        let change = selection.toggle(seat_id)?;
        self.updated_at = Utc::now();
        Ok(change)
    }

    /// Move to confirmation. On failure the seat selection is kept as is.
    pub fn continue_to_booking(&mut self, user: Option<&User>) -> Result<&BookingContext, FlowError> {
        let Stage::SeatSelection(selection) = &self.stage else {
            return Err(self.invalid(StageKind::Confirmation));
        };

        let context = selection.continue_to_booking(user)?;
        self.enter(Stage::Confirmation(context));
        self.context()
    }

    pub fn begin_booking(&mut self) -> Result<(FlowTicket, BookingContext), FlowError> {
        let Stage::Confirmation(context) = &self.stage else {
            return Err(self.invalid(StageKind::Confirmed));
        };
        if self.booking_in_flight {
            return Err(FlowError::Busy);
        }

        let context = context.clone();
        self.booking_in_flight = true;
        self.updated_at = Utc::now();
        Ok((self.ticket(), context))
    }

    pub fn complete_booking(
        &mut self,
        ticket: FlowTicket,
        confirmation: BookingConfirmation,
    ) -> Result<&BookingConfirmation, FlowError> {
        self.check_ticket(ticket)?;
        let Stage::Confirmation(context) = &self.stage else {
            return Err(self.invalid(StageKind::Confirmed));
        };

        let context = context.clone();
        self.booking_in_flight = false;
        self.enter(Stage::Confirmed { context, confirmation });
        match &self.stage {
            Stage::Confirmed { confirmation, .. } => Ok(confirmation),
            _ => Err(self.invalid(StageKind::Confirmed)),
        }
    }

    /// Booking call failed; allow another attempt.
    pub fn abort_booking(&mut self, ticket: FlowTicket) -> Result<(), FlowError> {
        self.check_ticket(ticket)?;
        self.booking_in_flight = false;
        Ok(())
    }

    pub fn listing(&self) -> Result<&ResultsListing, FlowError> {
        match &self.stage {
            Stage::Results(listing) => Ok(listing),
            _ => Err(self.invalid(StageKind::Results)),
        }
    }

    pub fn selection(&self) -> Result<&SeatSelection, FlowError> {
        match &self.stage {
            Stage::SeatSelection(selection) => Ok(selection),
            _ => Err(self.invalid(StageKind::SeatSelection)),
        }
    }

    pub fn context(&self) -> Result<&BookingContext, FlowError> {
        match &self.stage {
            Stage::Confirmation(context) | Stage::Confirmed { context, .. } => Ok(context),
            _ => Err(self.invalid(StageKind::Confirmation)),
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.epoch += 1;
        self.updated_at = Utc::now();
    }

    fn ticket(&self) -> FlowTicket {
        FlowTicket { epoch: self.epoch }
    }

    fn check_ticket(&self, ticket: FlowTicket) -> Result<(), FlowError> {
        if ticket.epoch != self.epoch {
            tracing::warn!(
                "Discarding stale result for flow {}: ticket {} vs current {}",
                self.id,
                ticket.epoch,
                self.epoch
            );
            return Err(FlowError::Stale {
                ticket: ticket.epoch,
                current: self.epoch,
            });
        }
        Ok(())
    }

    fn invalid(&self, to: StageKind) -> FlowError {
        FlowError::InvalidTransition {
            from: self.kind(),
            to,
        }
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}
