use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use todo_stations::config::Config;
use todo_stations::handler::TodoHandler;
use todo_stations::routes;
use todo_stations::store::SqliteStore;

fn init_store(config: &Config) -> io::Result<SqliteStore> {
  let store = SqliteStore::open(&config.db_path)
    .and_then(|store| store.migrate().map(|_| store))
    .map_err(|e| {
      log::error!("open database {}: {}", config.db_path.display(), e);
      io::Error::new(io::ErrorKind::Other, e)
    })?;
  Ok(store.with_default_page_size(config.default_page_size))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  dotenvy::dotenv().ok();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let config = Config::from_env().map_err(|e| {
    log::error!("load config: {}", e);
    io::Error::new(io::ErrorKind::InvalidInput, e)
  })?;
  let store = init_store(&config)?;
  log::info!("database ready at {}", config.db_path.display());

  let handler = web::Data::new(TodoHandler::new(store));
  let addr = config.listen_addr();
  log::info!("listening on {}", addr);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .app_data(handler.clone())
      .configure(routes::configure::<SqliteStore>)
  })
  .bind(addr)?
  .run()
  .await
}
