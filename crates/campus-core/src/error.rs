//! Error types for `campus-core`.
//!
//! Every variant is a validation failure: it is raised while building a
//! command input, before any backend is touched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Message and sender required")]
  MessageRequired,

  #[error("Login and display_name required")]
  LoginRequired,

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("invalid {name}: {value:?}")]
  InvalidParameter { name: &'static str, value: String },
}

impl Error {
  /// Build an [`Error::InvalidParameter`] for a query parameter that failed
  /// to parse.
  pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
    Self::InvalidParameter { name, value: value.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
