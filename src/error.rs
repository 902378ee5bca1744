use std::fmt;

use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryParam {
  PrevId,
  Size,
}

impl fmt::Display for QueryParam {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueryParam::PrevId => f.write_str("prevID"),
      QueryParam::Size => f.write_str("size"),
    }
  }
}

/// Everything a TODO request can fail with. `Display` is the exact text sent
/// to the client, so store failures never leak their detail.
#[derive(Debug, Error)]
pub enum TodoError {
  #[error("Invalid request payload")]
  InvalidPayload(#[source] serde_json::Error),

  #[error("Subject is empty")]
  EmptySubject,

  #[error("ID is empty")]
  MissingId,

  #[error("{0} is empty")]
  InvalidQueryParam(QueryParam),

  #[error("Id not found")]
  NotFound,

  #[error("Failed to create TODO")]
  CreateFailed(#[source] StoreError),

  #[error("Failed to update TODO")]
  UpdateFailed(#[source] StoreError),

  #[error("Failed to read TODOs")]
  ReadFailed(#[source] StoreError),

  #[error("Failed to delete TODOs")]
  DeleteFailed(#[source] StoreError),

  #[error("Method not allowed")]
  MethodNotAllowed,
}

pub const ALLOWED_METHODS: &str = "GET, POST, PUT";

impl ResponseError for TodoError {
  fn status_code(&self) -> StatusCode {
    match self {
      TodoError::InvalidPayload(_)
      | TodoError::EmptySubject
      | TodoError::MissingId
      | TodoError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
      TodoError::NotFound => StatusCode::NOT_FOUND,
      TodoError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      TodoError::CreateFailed(_)
      | TodoError::UpdateFailed(_)
      | TodoError::ReadFailed(_)
      | TodoError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let mut res = HttpResponse::build(self.status_code());
    if let TodoError::MethodNotAllowed = self {
      res.set_header(header::ALLOW, ALLOWED_METHODS);
    }
    res
      .content_type("text/plain; charset=utf-8")
      .body(self.to_string())
  }
}
