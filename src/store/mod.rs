//! # Task Store
//!
//! Persistence seam for task records. The [`TaskStore`] trait executes
//! validated [`crate::query::ListQuery`] values and the usual CRUD
//! operations; consistency (id uniqueness, atomic create, not-found on
//! delete) is delegated to the backing store's transactional guarantees.
//!
//! Two adapters ship with the crate: [`postgres::PgTaskStore`] for production
//! and [`memory::MemoryTaskStore`] for tests and embedded use. Both apply
//! filters, sort and the offset/limit window exactly as the query builder
//! computed them, look-ahead row included.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Task;
use crate::query::ListQuery;

pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;

/// Store-level failures, mapped to the crate taxonomy at the service
/// boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Unique-constraint violation on create, or a lost compare-and-swap on
    /// update.
    #[error("unique constraint violation")]
    Conflict,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistence contract for task records. Summaries cross this boundary in
/// their encrypted form; the store never sees plaintext.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Task, StoreError>;

    async fn create(&self, task: Task) -> Result<Task, StoreError>;

    /// Execute a validated query: filter conjunction, resolved sort, then the
    /// offset/limit window. Returns at most `page_size + 1` rows.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Task>, StoreError>;

    /// Compare-and-swap update: `previous` must still match the stored row,
    /// otherwise the write is a [`StoreError::Conflict`].
    async fn update(&self, id: Uuid, previous: Task, next: Task) -> Result<Task, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
