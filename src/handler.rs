//! Request handling between the wire and the store: decoding, validation,
//! one store call per request, and response envelopes.

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use crate::error::{QueryParam, TodoError};
use crate::model::{
  CreateTodoRequest, CreateTodoResponse, DeleteTodoRequest, DeleteTodoResponse, ReadTodoQuery,
  ReadTodoRequest, ReadTodoResponse, UpdateTodoRequest, UpdateTodoResponse,
};
use crate::store::TodoStore;

pub struct TodoHandler<S> {
  store: S,
}

impl<S: TodoStore> TodoHandler<S> {
  pub fn new(store: S) -> Self {
    TodoHandler { store }
  }

  #[cfg(test)]
  pub(crate) fn store(&self) -> &S {
    &self.store
  }

  pub fn create(&self, req: CreateTodoRequest) -> Result<CreateTodoResponse, TodoError> {
    if req.subject.is_empty() {
      log::debug!("rejecting create: empty subject");
      return Err(TodoError::EmptySubject);
    }
    let todo = self
      .store
      .create_todo(&req.subject, &req.description)
      .map_err(|e| {
        log::error!("create todo: {}", e);
        TodoError::CreateFailed(e)
      })?;
    Ok(CreateTodoResponse { todo })
  }

  pub fn update(&self, req: UpdateTodoRequest) -> Result<UpdateTodoResponse, TodoError> {
    if req.id == 0 {
      log::debug!("rejecting update: missing id");
      return Err(TodoError::MissingId);
    }
    if req.subject.is_empty() {
      log::debug!("rejecting update of {}: empty subject", req.id);
      return Err(TodoError::EmptySubject);
    }
    let todo = self
      .store
      .update_todo(req.id, &req.subject, &req.description)
      .map_err(|e| {
        log::error!("update todo {}: {}", req.id, e);
        TodoError::UpdateFailed(e)
      })?
      .ok_or(TodoError::NotFound)?;
    Ok(UpdateTodoResponse { todo })
  }

  pub fn read(&self, req: ReadTodoRequest) -> Result<ReadTodoResponse, TodoError> {
    let todos = self
      .store
      .read_todo(req.prev_id, req.size)
      .map_err(|e| {
        log::error!("read todos after {} (size {}): {}", req.prev_id, req.size, e);
        TodoError::ReadFailed(e)
      })?;
    Ok(ReadTodoResponse { todos })
  }

  pub fn delete(&self, req: DeleteTodoRequest) -> Result<DeleteTodoResponse, TodoError> {
    self.store.delete_todo(&req.ids).map_err(|e| {
      log::error!("delete todos {:?}: {}", req.ids, e);
      TodoError::DeleteFailed(e)
    })?;
    Ok(DeleteTodoResponse {})
  }
}

/// Decodes a JSON request body into the operation's request shape. Only a
/// JSON object is accepted; derived struct decoding would also take arrays.
pub fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, TodoError> {
  let decoded = serde_json::from_slice::<Value>(body).and_then(|value| match value {
    Value::Object(_) => serde_json::from_value(value),
    _ => Err(serde_json::Error::custom("request body must be a JSON object")),
  });
  decoded.map_err(|e| {
    log::debug!("invalid payload: {}", e);
    TodoError::InvalidPayload(e)
  })
}

impl ReadTodoQuery {
  /// Picks `prev_id` and `size` out of a raw query string. A repeated key
  /// keeps its first value; unknown keys are ignored.
  pub fn from_query_string(query: &str) -> Self {
    let mut raw = ReadTodoQuery::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
      let slot = match &*key {
        "prev_id" => &mut raw.prev_id,
        "size" => &mut raw.size,
        _ => continue,
      };
      if slot.is_none() {
        *slot = Some(value.into_owned());
      }
    }
    raw
  }

  /// Absent or empty parameters default to 0.
  pub fn parse(&self) -> Result<ReadTodoRequest, TodoError> {
    Ok(ReadTodoRequest {
      prev_id: parse_param(self.prev_id.as_deref(), QueryParam::PrevId)?,
      size: parse_param(self.size.as_deref(), QueryParam::Size)?,
    })
  }
}

fn parse_param(raw: Option<&str>, param: QueryParam) -> Result<i64, TodoError> {
  match raw {
    None | Some("") => Ok(0),
    Some(v) => v.parse().map_err(|_| {
      log::debug!("invalid {} query parameter: {:?}", param, v);
      TodoError::InvalidQueryParam(param)
    }),
  }
}
