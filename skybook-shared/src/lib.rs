pub mod pii;
pub mod models;

pub use pii::Masked;
pub use models::events::FlowEvent;
pub use models::notice::Notice;
