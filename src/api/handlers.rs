use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use crate::models::{Book, BookPayload, BookResponse};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `GET /api/books` and `GET /api/books?search=term`.
///
/// A blank search term falls back to the full listing. Search results carry
/// no price; the full listing asks the model for one per book.
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<BookResponse>>, StatusCode> {
    match params.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let books = state.repository.search(term).await.map_err(internal)?;
            Ok(Json(books.into_iter().map(BookResponse::without_price).collect()))
        }
        _ => {
            let books = state.repository.find_all().await.map_err(internal)?;
            Ok(Json(with_prices(&state, books).await))
        }
    }
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, StatusCode> {
    let book = state
        .repository
        .find_by_id(id)
        .await
        .map_err(internal)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let price = state.oracle.price_or_none(&book.title, &book.author).await;
    Ok(Json(BookResponse::new(book, price)))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookPayload>,
) -> Result<(StatusCode, Json<BookResponse>), StatusCode> {
    let book = state.repository.insert(&payload).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(BookResponse::without_price(book))))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<BookResponse>, StatusCode> {
    let book = state
        .repository
        .update(id, &payload)
        .await
        .map_err(internal)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(BookResponse::without_price(book)))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.repository.delete(id).await.map_err(internal)?;
    if deleted {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// One lookup per book, sequential; the oracle's semaphore caps fan-out
/// across concurrent requests.
async fn with_prices(state: &AppState, books: Vec<Book>) -> Vec<BookResponse> {
    let mut out = Vec::with_capacity(books.len());
    for book in books {
        let price = state.oracle.price_or_none(&book.title, &book.author).await;
        out.push(BookResponse::new(book, price));
    }
    out
}

fn internal(err: crate::data::RepositoryError) -> StatusCode {
    tracing::error!("repository error: {err}");
    StatusCode::INTERNAL_SERVER_ERROR
}
