use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::DEFAULT_PAGE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {name}: {value:?}")]
  Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub bind_addr: String,
  pub port: u16,
  pub db_path: PathBuf,
  pub default_page_size: i64,
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let port = match lookup("PORT") {
      Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
        name: "PORT",
        value: v,
      })?,
      None => 8080,
    };
    let default_page_size = match lookup("DEFAULT_PAGE_SIZE") {
      Some(v) => match v.parse::<i64>() {
        Ok(n) if n > 0 => n,
        _ => {
          return Err(ConfigError::Invalid {
            name: "DEFAULT_PAGE_SIZE",
            value: v,
          })
        }
      },
      None => DEFAULT_PAGE_SIZE,
    };

    Ok(Config {
      bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
      port,
      db_path: lookup("DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".sqlite3/todo.db")),
      default_page_size,
    })
  }

  pub fn listen_addr(&self) -> String {
    format!("{}:{}", self.bind_addr, self.port)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| vars.get(key).cloned()
  }

  #[test]
  fn defaults_when_unset() {
    let config = Config::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    assert_eq!(config.db_path, PathBuf::from(".sqlite3/todo.db"));
    assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
  }

  #[test]
  fn reads_overrides() {
    let config = Config::from_lookup(lookup(&[
      ("BIND_ADDR", "0.0.0.0"),
      ("PORT", "3000"),
      ("DB_PATH", "/tmp/todo.db"),
      ("DEFAULT_PAGE_SIZE", "20"),
    ]))
    .unwrap();
    assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    assert_eq!(config.db_path, PathBuf::from("/tmp/todo.db"));
    assert_eq!(config.default_page_size, 20);
  }

  #[test]
  fn rejects_bad_numbers() {
    assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
    assert!(Config::from_lookup(lookup(&[("DEFAULT_PAGE_SIZE", "0")])).is_err());
  }
}
