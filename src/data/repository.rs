//! Book repository for PostgreSQL operations
//! Implements repository pattern for data persistence

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Database;
use crate::models::{Book, BookPayload};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Main catalog repository
pub struct BookRepository {
    pool: Arc<PgPool>,
}

impl BookRepository {
    /// Create new repository instance
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create database pool from settings
    pub async fn create_pool(settings: &Database) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect(&settings.url)
            .await
            .context("Failed to connect to PostgreSQL database")
    }

    /// Apply pending schema migrations
    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!().run(self.pool.as_ref()).await?;
        Ok(())
    }

    /// Test database connection
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .context("Database connection test failed")?;
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(books)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(book)
    }

    /// Case-insensitive keyword search over title, author, genre and isbn
    pub async fn search(&self, term: &str) -> Result<Vec<Book>, RepositoryError> {
        let pattern = format!("%{}%", term.trim());
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE title ILIKE $1
               OR author ILIKE $1
               OR genre ILIKE $1
               OR isbn ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(books)
    }

    pub async fn insert(&self, payload: &BookPayload) -> Result<Book, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, genre, pages, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.isbn)
        .bind(&payload.genre)
        .bind(payload.pages)
        .bind(&payload.status)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(book)
    }

    /// Full update of the mutable fields. Returns None when the id is unknown.
    pub async fn update(
        &self,
        id: i64,
        payload: &BookPayload,
    ) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                isbn = $4,
                genre = $5,
                pages = $6,
                status = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.isbn)
        .bind(&payload.genre)
        .bind(payload.pages)
        .bind(&payload.status)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(book)
    }

    /// Returns true when a row was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
