use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::flow::{BookingFlow, FlowError};

/// Live booking flows, one per client walking through the pages.
pub struct FlowRegistry {
    flows: HashMap<Uuid, BookingFlow>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    /// Start a new flow at the search stage
    pub fn create(&mut self) -> &BookingFlow {
        let flow = BookingFlow::new();
        let id = flow.id();
        self.flows.entry(id).or_insert(flow)
    }

    pub fn get(&self, id: &Uuid) -> Result<&BookingFlow, FlowError> {
        self.flows.get(id).ok_or(FlowError::NotFound(*id))
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Result<&mut BookingFlow, FlowError> {
        self.flows.get_mut(id).ok_or(FlowError::NotFound(*id))
    }

    /// Drop a flow after completion or when the client navigates away.
    pub fn discard(&mut self, id: &Uuid) -> Option<BookingFlow> {
        self.flows.remove(id)
    }

    /// Remove flows untouched for longer than `max_idle`.
    pub fn cleanup_idle(&mut self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let initial = self.flows.len();
        self.flows.retain(|_, flow| flow.updated_at() > cutoff);
        initial - self.flows.len()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
