//! Persistence layer for the book catalog.

pub mod repository;

pub use repository::{BookRepository, RepositoryError};
