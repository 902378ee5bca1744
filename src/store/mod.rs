//! Persistence collaborator for TODOs. The handler only ever talks to the
//! [`TodoStore`] trait, so backends can be swapped without touching it.

use thiserror::Error;

use crate::model::Todo;

mod sqlite;

pub use sqlite::{SqliteStore, DEFAULT_PAGE_SIZE};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("connection pool error: {0}")]
  Pool(#[from] r2d2::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store call was canceled before it completed")]
  Canceled,
}

/// Durable CRUD over TODOs, ordered by their store-assigned `id`.
///
/// Implementations must be safe to call from many requests at once and must
/// hand out strictly increasing ids so `id` works as a pagination cursor.
pub trait TodoStore: Send + Sync {
  fn create_todo(&self, subject: &str, description: &str) -> Result<Todo, StoreError>;

  /// Returns `Ok(None)` when no TODO has the given id.
  fn update_todo(
    &self,
    id: i64,
    subject: &str,
    description: &str,
  ) -> Result<Option<Todo>, StoreError>;

  /// At most `size` TODOs with `id > prev_id`, ascending by id.
  /// `size <= 0` selects the store's default page size.
  fn read_todo(&self, prev_id: i64, size: i64) -> Result<Vec<Todo>, StoreError>;

  /// Unknown ids are ignored.
  fn delete_todo(&self, ids: &[i64]) -> Result<(), StoreError>;
}
