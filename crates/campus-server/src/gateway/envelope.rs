//! Request and response envelopes exchanged with the gateway.
//!
//! Field names follow the gateway's camelCase wire format.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Error;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const HEADER_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const HEADER_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

const ALLOWED_REQUEST_HEADERS: &str = "Content-Type, X-Authorization";

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
  #[serde(default = "default_method")]
  pub http_method:             String,
  #[serde(default, alias = "queryParameters")]
  pub query_string_parameters: Option<BTreeMap<String, String>>,
  #[serde(default)]
  pub body:                    Option<String>,
}

fn default_method() -> String { "GET".to_owned() }

impl RequestEnvelope {
  pub fn new(method: impl Into<String>) -> Self {
    Self { http_method: method.into(), ..Default::default() }
  }

  pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self
      .query_string_parameters
      .get_or_insert_with(BTreeMap::new)
      .insert(name.into(), value.into());
    self
  }

  pub fn with_body(mut self, body: impl Into<String>) -> Self {
    self.body = Some(body.into());
    self
  }

  /// A query-string parameter, if present.
  pub fn param(&self, name: &str) -> Option<&str> {
    self
      .query_string_parameters
      .as_ref()
      .and_then(|p| p.get(name))
      .map(String::as_str)
  }

  /// Decode the body as JSON. A missing or blank body decodes as `{}`.
  pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
    let raw = match self.body.as_deref().map(str::trim) {
      None | Some("") => "{}",
      Some(b) => b,
    };
    serde_json::from_str(raw).map_err(Error::InvalidBody)
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
  pub status_code:       u16,
  pub headers:           BTreeMap<String, String>,
  pub body:              String,
  pub is_base64_encoded: bool,
}

impl ResponseEnvelope {
  /// A JSON response carrying the CORS origin header.
  pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self, Error> {
    let body = serde_json::to_string(body)?;
    let mut env = Self::plain(status, body);
    env
      .headers
      .insert(HEADER_CONTENT_TYPE.to_owned(), "application/json".to_owned());
    Ok(env)
  }

  /// A response with an arbitrary body and only the CORS origin header.
  pub fn plain(status: StatusCode, body: impl Into<String>) -> Self {
    let mut headers = BTreeMap::new();
    headers.insert(HEADER_ALLOW_ORIGIN.to_owned(), "*".to_owned());
    Self {
      status_code: status.as_u16(),
      headers,
      body: body.into(),
      is_base64_encoded: false,
    }
  }

  /// The empty 200 answer to an `OPTIONS` preflight.
  pub fn preflight(allowed_methods: &str) -> Self {
    let mut env = Self::plain(StatusCode::OK, "");
    env
      .headers
      .insert(HEADER_ALLOW_METHODS.to_owned(), allowed_methods.to_owned());
    env
      .headers
      .insert(HEADER_ALLOW_HEADERS.to_owned(), ALLOWED_REQUEST_HEADERS.to_owned());
    env
  }
}
