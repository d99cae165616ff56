//! Store abstraction for the book catalog.
//!
//! Two implementations satisfy the same contract and are selected at
//! startup: [`MemoryStore`] for an ephemeral in-process catalog and
//! [`DbStore`] for the relational, soft-deleting one.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookPatch, NewBook};

pub mod database;
pub mod memory;

pub use database::DbStore;
pub use memory::MemoryStore;

/// Listing is capped regardless of catalog size.
pub const LIST_LIMIT: u64 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Backend(#[from] sea_orm::DbErr),
}

/// Persistence operations for the book catalog.
///
/// Callers validate payloads before `create`; the store assigns ids and
/// timestamps. Identifiers, once issued, are never reassigned.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new record, assigning id and timestamps.
    async fn create(&self, new: NewBook) -> Result<Book, StoreError>;

    /// Fetch the live record with the given id.
    async fn get(&self, id: i64) -> Result<Book, StoreError>;

    /// Up to [`LIST_LIMIT`] live records in ascending id order.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    /// Apply the supplied fields to an existing record and refresh its
    /// update timestamp. The id and creation timestamp never change.
    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book, StoreError>;

    /// Remove the record with the given id, returning the id. Fails
    /// without mutation when the id has no live record.
    async fn delete(&self, id: i64) -> Result<i64, StoreError>;
}
