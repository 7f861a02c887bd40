pub mod flights;
pub mod seats;
pub mod pricing;
pub mod listing;

pub use flights::{airport_city, MockFlightCatalog};
pub use seats::{CabinSection, SeatGenerator, SeatMap};
pub use pricing::{PricingEngine, Quote};
pub use listing::{FallbackPolicy, ResultsListing};
