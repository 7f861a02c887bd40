pub mod flight;
pub mod search;
pub mod repository;
pub mod identity;
pub mod session;
pub mod booking;

pub use flight::{Airport, Flight, FlightEndpoint, Seat, SeatClass};
pub use search::{PassengerCount, SearchForm, SearchQuery, TripType};
pub use identity::{Credentials, IdentityProvider, MockIdentityProvider, SignupDetails, User};
pub use session::SessionStore;
pub use booking::{BookingConfirmation, BookingContext, BookingGateway, SimulatedBookingGateway};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Identity provider error: {0}")]
    Identity(String),
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error("Booking service error: {0}")]
    Booking(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Error type returned by the data-access traits in [`repository`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
