//! Gateway error taxonomy and its mapping onto response envelopes.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::gateway::envelope::ResponseEnvelope;

/// An error that terminates a request. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
  /// No backend is configured; raised before any backend call.
  #[error("Database configuration missing")]
  Configuration,

  /// A required field is missing or malformed; raised before any backend call.
  #[error("{0}")]
  Validation(#[from] campus_core::Error),

  #[error("invalid JSON body: {0}")]
  InvalidBody(#[source] serde_json::Error),

  #[error("body is not valid UTF-8")]
  NotUtf8,

  #[error("request body too large")]
  PayloadTooLarge,

  #[error("invalid query string: {0}")]
  InvalidQuery(String),

  #[error("Method not allowed")]
  MethodNotAllowed,

  #[error("{0}")]
  NotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Any failure reported by the store. The transaction in flight has
  /// already been rolled back by the time this is seen.
  #[error("{0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  error: &'a str,
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Validation(_)
      | Error::InvalidBody(_)
      | Error::NotUtf8
      | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
      Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
      Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Configuration | Error::Serialization(_) | Error::Backend(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// Render as a JSON `{"error": "..."}` envelope.
  pub fn into_envelope(self) -> ResponseEnvelope {
    let message = self.to_string();
    let rendered = ResponseEnvelope::json(self.status(), &ErrorBody { error: &message });
    rendered.unwrap_or_else(|_| ResponseEnvelope::plain(StatusCode::INTERNAL_SERVER_ERROR, message))
  }
}
