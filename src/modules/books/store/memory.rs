//! In-process catalog backed by a plain sequence scanned linearly by id.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{BookStore, StoreError, LIST_LIMIT};
use crate::modules::books::models::{Book, BookPatch, NewBook};

/// Ephemeral store holding the catalog in a mutex-guarded `Vec`.
///
/// Deletion splices the row out, but the id counter is monotonic so an
/// identifier, once issued, is never handed out again.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    next_id: i64,
    rows: Vec<Book>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock still holds consistent data; every mutation
        // below completes without panicking mid-write.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, new: NewBook) -> Result<Book, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        let book = Book {
            id: inner.next_id,
            author: new.author,
            title: new.title,
            created_at: now,
            updated_at: now,
        };
        inner.next_id += 1;
        inner.rows.push(book.clone());
        Ok(book)
    }

    async fn get(&self, id: i64) -> Result<Book, StoreError> {
        self.lock()
            .rows
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        // Rows are appended with ascending ids, so the sequence is
        // already ordered.
        Ok(self
            .lock()
            .rows
            .iter()
            .take(LIST_LIMIT as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book, StoreError> {
        let mut inner = self.lock();
        let book = inner
            .rows
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(author) = patch.author {
            book.author = author;
        }
        if let Some(title) = patch.title {
            book.title = title;
        }
        book.updated_at = Utc::now();

        Ok(book.clone())
    }

    async fn delete(&self, id: i64) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        let position = inner
            .rows
            .iter()
            .position(|book| book.id == id)
            .ok_or(StoreError::NotFound(id))?;
        inner.rows.remove(position);
        Ok(id)
    }
}
