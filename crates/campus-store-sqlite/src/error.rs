//! Error type for `campus-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The `users.login` uniqueness constraint rejected an insert.
  #[error("login already exists: {0}")]
  LoginTaken(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role in users row: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
