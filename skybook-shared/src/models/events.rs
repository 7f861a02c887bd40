use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events published by the API whenever the session or a booking flow
/// changes in a way other listeners care about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowEvent {
    SessionStarted {
        user_id: String,
        timestamp: DateTime<Utc>,
    },
    SessionEnded {
        timestamp: DateTime<Utc>,
    },
    BookingConfirmed {
        flow_id: Option<Uuid>,
        flight_id: String,
        reference: String,
        seats: Vec<String>,
        total_amount: i32,
        timestamp: DateTime<Utc>,
    },
}

impl FlowEvent {
    /// Topic-style name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::SessionStarted { .. } => "session.started",
            FlowEvent::SessionEnded { .. } => "session.ended",
            FlowEvent::BookingConfirmed { .. } => "booking.confirmed",
        }
    }
}
