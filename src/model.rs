use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
  pub id: i64,
  pub subject: String,
  pub description: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// Missing or null fields decode to their zero value so that validation, not
// the decoder, reports an empty subject or a missing id.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
  #[serde(default, deserialize_with = "null_as_default")]
  pub subject: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTodoResponse {
  pub todo: Todo,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
  #[serde(default, deserialize_with = "null_as_default")]
  pub id: i64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub subject: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTodoResponse {
  pub todo: Todo,
}

/// Cursor page request. `prev_id == 0` starts at the head of the collection,
/// `size == 0` lets the store pick its default page size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadTodoRequest {
  pub prev_id: i64,
  pub size: i64,
}

/// Query string as it arrives on the wire, before integer parsing.
#[derive(Debug, Default, PartialEq)]
pub struct ReadTodoQuery {
  pub prev_id: Option<String>,
  pub size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadTodoResponse {
  pub todos: Vec<Todo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteTodoRequest {
  #[serde(default, deserialize_with = "null_as_default")]
  pub ids: Vec<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteTodoResponse {}
