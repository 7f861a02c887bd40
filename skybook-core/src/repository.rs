use async_trait::async_trait;
use std::sync::RwLock;

use crate::flight::{Airport, Flight};
use crate::BoxError;

/// Read access to the flight catalog
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn list_flights(&self) -> Result<Vec<Flight>, BoxError>;

    async fn get_flight(&self, id: &str) -> Result<Option<Flight>, BoxError>;

    async fn list_airports(&self) -> Result<Vec<Airport>, BoxError>;
}

/// A single named slot of durable key-value storage holding the
/// serialized session record.
#[async_trait]
pub trait SessionSlot: Send + Sync {
    /// Name of the key backing this slot
    fn key(&self) -> &str;

    async fn load(&self) -> Result<Option<String>, BoxError>;

    /// Overwrites whatever was stored before.
    async fn store(&self, value: &str) -> Result<(), BoxError>;

    async fn clear(&self) -> Result<(), BoxError>;
}

/// Process-local slot, for tests and the `memory` backend.
pub struct InMemorySessionSlot {
    key: String,
    value: RwLock<Option<String>>,
}

impl InMemorySessionSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: RwLock::new(None),
        }
    }
}

#[async_trait]
impl SessionSlot for InMemorySessionSlot {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Option<String>, BoxError> {
        let value = self.value.read().map_err(|e| e.to_string())?;
        Ok(value.clone())
    }

    async fn store(&self, value: &str) -> Result<(), BoxError> {
        let mut slot = self.value.write().map_err(|e| e.to_string())?;
        *slot = Some(value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), BoxError> {
        let mut slot = self.value.write().map_err(|e| e.to_string())?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_slot_overwrites_and_clears() {
        let slot = InMemorySessionSlot::new("flight_booking_user");
        assert_eq!(slot.load().await.unwrap(), None);

        slot.store("first").await.unwrap();
        slot.store("second").await.unwrap();
        assert_eq!(slot.load().await.unwrap().as_deref(), Some("second"));

        slot.clear().await.unwrap();
        assert_eq!(slot.load().await.unwrap(), None);
        assert_eq!(slot.key(), "flight_booking_user");
    }
}
