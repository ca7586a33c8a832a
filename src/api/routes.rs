use axum::Router;
use std::sync::Arc;

use super::{handlers, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", axum::routing::get(handlers::health))
        .route(
            "/api/books",
            axum::routing::get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/api/books/:id",
            axum::routing::get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .with_state(state)
}
