pub mod selection;
pub mod context;
pub mod flow;
pub mod registry;

pub use selection::{SeatSelection, SelectionChange, SelectionError, SelectionView};
pub use context::{BookingContextDraft, ContextError};
pub use flow::{BookingFlow, FlowError, FlowTicket, Stage, StageKind};
pub use registry::FlowRegistry;
