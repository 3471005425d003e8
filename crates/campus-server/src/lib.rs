//! HTTP front end for the Campus school backend.
//!
//! Each endpoint is mounted as a single axum route accepting any method. The
//! request is folded into a [`RequestEnvelope`], dispatched through
//! [`gateway::handle`], and the resulting [`ResponseEnvelope`] is turned back
//! into an HTTP response.

pub mod error;
pub mod gateway;

pub use error::Error;

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Query, Request, State},
  http::{HeaderName, HeaderValue, StatusCode},
  response::{IntoResponse, Response},
  routing::any,
};
use campus_core::store::SchoolStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use gateway::{Endpoint, RequestEnvelope, ResponseEnvelope};

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `campus.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  /// SQLite database location, optionally prefixed with `sqlite://`.
  /// When absent, every request fails with a configuration error.
  #[serde(default)]
  pub database_url: Option<String>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  /// The filesystem path of the configured database, if any.
  pub fn database_path(&self) -> Option<PathBuf> {
    let url = self.database_url.as_deref()?.trim();
    let path = url.strip_prefix("sqlite://").unwrap_or(url);
    (!path.is_empty()).then(|| PathBuf::from(path))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SchoolStore> {
  /// `None` when no database is configured.
  pub store: Option<Arc<S>>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] serving every [`Endpoint`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let mut router = Router::new();
  for endpoint in Endpoint::ALL {
    router = router.route(
      endpoint.path(),
      any(move |State(state): State<AppState<S>>, req: Request| {
        serve(state, endpoint, req)
      }),
    );
  }
  router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn serve<S>(state: AppState<S>, endpoint: Endpoint, req: Request) -> Response
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let envelope = match into_envelope(req).await {
    Ok(env) => env,
    Err(res) => return res,
  };
  gateway::handle(state.store.as_deref(), endpoint, envelope)
    .await
    .into_response()
}

async fn into_envelope(req: Request) -> Result<RequestEnvelope, Response> {
  let (parts, body) = req.into_parts();

  let params = match parts.uri.query() {
    None => None,
    Some(_) => match Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri) {
      Ok(Query(p)) => Some(p),
      Err(e) => return Err(Error::InvalidQuery(e.body_text()).into_envelope().into_response()),
    },
  };

  let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
    .await
    .map_err(|_| Error::PayloadTooLarge.into_envelope().into_response())?;
  let body = std::str::from_utf8(&bytes)
    .map_err(|_| Error::NotUtf8.into_envelope().into_response())?;

  Ok(RequestEnvelope {
    http_method:             parts.method.as_str().to_owned(),
    query_string_parameters: params,
    body:                    Some(body.to_owned()),
  })
}

impl IntoResponse for ResponseEnvelope {
  fn into_response(self) -> Response {
    let status =
      StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut res = (status, self.body).into_response();
    for (name, value) in self.headers {
      match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        (Ok(name), Ok(value)) => {
          res.headers_mut().insert(name, value);
        }
        _ => tracing::warn!("dropping invalid response header"),
      }
    }
    res
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
