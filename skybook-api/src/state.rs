use skybook_booking::FlowRegistry;
use skybook_catalog::{FallbackPolicy, PricingEngine, SeatGenerator};
use skybook_core::repository::FlightRepository;
use skybook_core::{BookingGateway, SessionStore};
use skybook_shared::FlowEvent;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub catalog: Arc<dyn FlightRepository>,
    pub gateway: Arc<dyn BookingGateway>,
    pub seats: Arc<SeatGenerator>,
    pub pricing: PricingEngine,
    pub flows: Arc<Mutex<FlowRegistry>>,
    pub events_tx: broadcast::Sender<FlowEvent>,
    pub fallback: FallbackPolicy,
}

impl AppState {
    /// Fan an event out to `/v1/events` subscribers. Having no subscriber is
    /// not an error.
    pub fn publish(&self, event: FlowEvent) {
        let name = event.name();
        match self.events_tx.send(event) {
            Ok(receivers) => tracing::debug!("Published {} to {} subscriber(s)", name, receivers),
            Err(_) => tracing::trace!("Dropped {}: no subscribers", name),
        }
    }
}
