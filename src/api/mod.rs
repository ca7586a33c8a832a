pub mod handlers;
pub mod routes;

pub use routes::create_router;

use crate::data::BookRepository;
use crate::pricing::PriceOracle;

/// Shared state for all handlers.
pub struct AppState {
    pub repository: BookRepository,
    pub oracle: PriceOracle,
}
