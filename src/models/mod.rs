use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog entry as stored in PostgreSQL. The display price is not part of
/// this struct: it is synthesized per request and never persisted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub pages: Option<i32>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A book as returned over HTTP, with the transient model-derived price
/// attached. `price` is null whenever the lookup produced nothing.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    #[serde(flatten)]
    pub book: Book,
    pub price: Option<String>,
}

impl BookResponse {
    pub fn new(book: Book, price: Option<String>) -> Self {
        Self { book, price }
    }

    pub fn without_price(book: Book) -> Self {
        Self { book, price: None }
    }
}
