//! Envelope-level request gateway.
//!
//! Every request is decoded into a [`Command`] before the store is touched.
//! The order of checks mirrors the deployed functions: preflight, backend
//! configuration, method, validation, then the store call.

pub mod command;
pub mod envelope;

use campus_core::store::SchoolStore;
use strum::{Display, EnumString};

pub use command::Command;
pub use envelope::{RequestEnvelope, ResponseEnvelope};

use crate::error::Error;

/// The resources served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
  Chat,
  Users,
  Subjects,
  Quota,
}

impl Endpoint {
  pub const ALL: [Endpoint; 4] = [Self::Chat, Self::Users, Self::Subjects, Self::Quota];

  /// HTTP path this endpoint is mounted at.
  pub fn path(self) -> &'static str {
    match self {
      Self::Chat => "/chat",
      Self::Users => "/users",
      Self::Subjects => "/subjects",
      Self::Quota => "/quota",
    }
  }

  /// Value of `Access-Control-Allow-Methods` in preflight answers.
  pub fn allowed_methods(self) -> &'static str {
    match self {
      Self::Chat | Self::Users => "GET, POST, OPTIONS",
      Self::Subjects | Self::Quota => "GET, OPTIONS",
    }
  }
}

/// The request methods the gateway understands. Anything else is a 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
  Get,
  Post,
  Options,
}

/// Dispatch one envelope to `store`.
///
/// `store` is `None` when no backend is configured; every request other than
/// a preflight then fails without touching anything.
pub async fn handle<S: SchoolStore>(
  store: Option<&S>,
  endpoint: Endpoint,
  req: RequestEnvelope,
) -> ResponseEnvelope {
  let method = req.http_method.parse::<Method>().ok();
  if method == Some(Method::Options) {
    return ResponseEnvelope::preflight(endpoint.allowed_methods());
  }

  tracing::debug!(%endpoint, method = %req.http_method, "dispatching request");

  match dispatch(store, endpoint, method, &req).await {
    Ok(res) => res,
    Err(e) => {
      // Store failures are already logged where they are raised.
      match &e {
        Error::Backend(_) => {}
        e if e.status().is_server_error() => {
          tracing::warn!(%endpoint, error = %e, "request failed");
        }
        e => tracing::debug!(%endpoint, error = %e, "request rejected"),
      }
      e.into_envelope()
    }
  }
}

async fn dispatch<S: SchoolStore>(
  store: Option<&S>,
  endpoint: Endpoint,
  method: Option<Method>,
  req: &RequestEnvelope,
) -> Result<ResponseEnvelope, Error> {
  let store = store.ok_or(Error::Configuration)?;
  let method = method.ok_or(Error::MethodNotAllowed)?;
  Command::decode(endpoint, method, req)?.execute(store).await
}
