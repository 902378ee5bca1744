use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{StoreError, TodoStore};
use crate::model::Todo;

pub const DEFAULT_PAGE_SIZE: i64 = 5;

// Stay well under SQLITE_MAX_VARIABLE_NUMBER on older builds.
const DELETE_CHUNK: usize = 500;

const SCHEMA: &str = "
  CREATE TABLE IF NOT EXISTS todos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL CHECK(subject <> ''),
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
  );
";

const SELECT_TODO: &str = "SELECT id, subject, description, created_at, updated_at FROM todos";

#[derive(Clone)]
pub struct SqliteStore {
  pool: Pool<SqliteConnectionManager>,
  default_page_size: i64,
}

impl SqliteStore {
  pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
    SqliteStore {
      pool,
      default_page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Opens (creating if needed) a database file, including its parent directory.
  pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
      if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
      }
    }
    let manager = SqliteConnectionManager::file(path)
      .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
    let pool = Pool::new(manager)?;
    Ok(Self::new(pool))
  }

  /// Every pooled connection to `:memory:` is its own database, so the pool
  /// is pinned to one connection that is never recycled.
  pub fn in_memory() -> Result<Self, StoreError> {
    let pool = Pool::builder()
      .max_size(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .build(SqliteConnectionManager::memory())?;
    Ok(Self::new(pool))
  }

  pub fn with_default_page_size(mut self, size: i64) -> Self {
    self.default_page_size = size;
    self
  }

  pub fn migrate(&self) -> Result<(), StoreError> {
    let conn = self.pool.get()?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Todo>> {
    conn
      .query_row(
        &format!("{} WHERE id = ?1", SELECT_TODO),
        params![id],
        row_to_todo,
      )
      .optional()
  }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
  Ok(Todo {
    id: row.get(0)?,
    subject: row.get(1)?,
    description: row.get(2)?,
    created_at: row.get(3)?,
    updated_at: row.get(4)?,
  })
}

impl TodoStore for SqliteStore {
  fn create_todo(&self, subject: &str, description: &str) -> Result<Todo, StoreError> {
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO todos (subject, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
      params![subject, description, Utc::now()],
    )?;
    let id = conn.last_insert_rowid();
    let todo = Self::find(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    Ok(todo)
  }

  fn update_todo(
    &self,
    id: i64,
    subject: &str,
    description: &str,
  ) -> Result<Option<Todo>, StoreError> {
    let conn = self.pool.get()?;
    let changed = conn.execute(
      "UPDATE todos SET subject = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
      params![subject, description, Utc::now(), id],
    )?;
    if changed == 0 {
      return Ok(None);
    }
    Ok(Self::find(&conn, id)?)
  }

  fn read_todo(&self, prev_id: i64, size: i64) -> Result<Vec<Todo>, StoreError> {
    let size = if size <= 0 {
      self.default_page_size
    } else {
      size
    };
    let conn = self.pool.get()?;
    let mut stmt = conn.prepare(&format!(
      "{} WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
      SELECT_TODO
    ))?;
    let todos = stmt
      .query_map(params![prev_id, size], row_to_todo)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(todos)
  }

  fn delete_todo(&self, ids: &[i64]) -> Result<(), StoreError> {
    if ids.is_empty() {
      return Ok(());
    }
    let mut conn = self.pool.get()?;
    let tx = conn.transaction()?;
    for chunk in ids.chunks(DELETE_CHUNK) {
      let placeholders = vec!["?"; chunk.len()].join(", ");
      tx.execute(
        &format!("DELETE FROM todos WHERE id IN ({})", placeholders),
        params_from_iter(chunk.iter()),
      )?;
    }
    tx.commit()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
  }

  fn seed(store: &SqliteStore, n: usize) -> Vec<Todo> {
    (0..n)
      .map(|i| store.create_todo(&format!("todo {}", i), "").unwrap())
      .collect()
  }

  #[test]
  fn migrate_is_idempotent() {
    let store = store();
    store.migrate().unwrap();
    assert!(store.read_todo(0, 0).unwrap().is_empty());
  }

  #[test]
  fn create_assigns_increasing_ids() {
    let store = store();
    let first = store.create_todo("buy milk", "2 litres").unwrap();
    let second = store.create_todo("walk dog", "").unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(first.subject, "buy milk");
    assert_eq!(first.description, "2 litres");
    assert_eq!(first.created_at, first.updated_at);
    assert!(second.id > first.id);
  }

  #[test]
  fn ids_are_not_reused_after_delete() {
    let store = store();
    let todos = seed(&store, 2);
    store.delete_todo(&[todos[1].id]).unwrap();
    let next = store.create_todo("again", "").unwrap();
    assert!(next.id > todos[1].id);
  }

  #[test]
  fn empty_subject_is_rejected_by_schema() {
    let store = store();
    assert!(store.create_todo("", "").is_err());
  }

  #[test]
  fn update_replaces_fields_and_advances_updated_at() {
    let store = store();
    let todo = store.create_todo("old", "old description").unwrap();

    let updated = store.update_todo(todo.id, "new", "").unwrap().unwrap();
    assert_eq!(updated.id, todo.id);
    assert_eq!(updated.subject, "new");
    assert_eq!(updated.description, "");
    assert_eq!(updated.created_at, todo.created_at);
    assert!(updated.updated_at >= todo.updated_at);
  }

  #[test]
  fn update_unknown_id_is_none() {
    let store = store();
    assert_eq!(store.update_todo(999, "x", "").unwrap(), None);
  }

  #[test]
  fn read_pages_follow_the_cursor() {
    let store = store();
    let all = seed(&store, 7);

    let first = store.read_todo(0, 3).unwrap();
    let second = store.read_todo(first.last().unwrap().id, 3).unwrap();
    let third = store.read_todo(second.last().unwrap().id, 3).unwrap();

    let ids: Vec<i64> = first
      .iter()
      .chain(&second)
      .chain(&third)
      .map(|t| t.id)
      .collect();
    let expected: Vec<i64> = all.iter().map(|t| t.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(third.len(), 1);
  }

  #[test]
  fn read_returns_only_ids_after_cursor() {
    let store = store();
    seed(&store, 4);
    let todos = store.read_todo(2, 10).unwrap();
    assert_eq!(todos.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
  }

  #[test]
  fn zero_size_uses_default_page_size() {
    let store = store().with_default_page_size(2);
    seed(&store, 4);
    assert_eq!(store.read_todo(0, 0).unwrap().len(), 2);
    assert_eq!(store.read_todo(0, -1).unwrap().len(), 2);
  }

  #[test]
  fn delete_ignores_unknown_ids() {
    let store = store();
    let todos = seed(&store, 3);
    store.delete_todo(&[todos[0].id, 42, todos[2].id]).unwrap();
    store.delete_todo(&[]).unwrap();

    let left = store.read_todo(0, 10).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, todos[1].id);
  }
}
