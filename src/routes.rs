use actix_web::{error::BlockingError, get, web, HttpRequest, HttpResponse, Responder};

use crate::error::TodoError;
use crate::handler::{decode_payload, TodoHandler};
use crate::model::{CreateTodoRequest, ReadTodoQuery, UpdateTodoRequest};
use crate::store::{StoreError, TodoStore};

#[get("/health")]
async fn health() -> impl Responder {
  HttpResponse::Ok().body("OK")
}

/// Mounts `/health` and the `/todos` resource for a handler of store type `S`,
/// which must be registered as `web::Data<TodoHandler<S>>`.
pub fn configure<S: TodoStore + 'static>(cfg: &mut web::ServiceConfig) {
  cfg.service(health).service(
    web::resource("/todos")
      .route(web::get().to(read_todos::<S>))
      .route(web::post().to(create_todo::<S>))
      .route(web::put().to(update_todo::<S>))
      .default_service(web::route().to(method_not_allowed)),
  );
}

async fn create_todo<S: TodoStore + 'static>(
  handler: web::Data<TodoHandler<S>>,
  body: web::Bytes,
) -> Result<HttpResponse, TodoError> {
  let req: CreateTodoRequest = decode_payload(&body)?;
  let res = blocking(TodoError::CreateFailed, move || handler.create(req)).await?;
  Ok(HttpResponse::Ok().json(res))
}

async fn update_todo<S: TodoStore + 'static>(
  handler: web::Data<TodoHandler<S>>,
  body: web::Bytes,
) -> Result<HttpResponse, TodoError> {
  let req: UpdateTodoRequest = decode_payload(&body)?;
  let res = blocking(TodoError::UpdateFailed, move || handler.update(req)).await?;
  Ok(HttpResponse::Ok().json(res))
}

async fn read_todos<S: TodoStore + 'static>(
  handler: web::Data<TodoHandler<S>>,
  request: HttpRequest,
) -> Result<HttpResponse, TodoError> {
  let req = ReadTodoQuery::from_query_string(request.query_string()).parse()?;
  let res = blocking(TodoError::ReadFailed, move || handler.read(req)).await?;
  Ok(HttpResponse::Ok().json(res))
}

async fn method_not_allowed() -> Result<HttpResponse, TodoError> {
  Err(TodoError::MethodNotAllowed)
}

// The store is synchronous, so each call runs on the blocking thread pool.
async fn blocking<F, T>(canceled: fn(StoreError) -> TodoError, f: F) -> Result<T, TodoError>
where
  F: FnOnce() -> Result<T, TodoError> + Send + 'static,
  T: Send + 'static,
{
  web::block(f).await.map_err(|e| match e {
    BlockingError::Error(e) => e,
    BlockingError::Canceled => canceled(StoreError::Canceled),
  })
}
