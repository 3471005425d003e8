//! Chat messages: an append-only log partitioned by channel.
//!
//! A channel is identified by its `chat_type` string: `"school"` for the
//! school-wide room, or any teacher-scoped value chosen by the client.
//! Messages are never updated or deleted once appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Channel used when a request does not name one.
pub const DEFAULT_CHANNEL: &str = "school";

/// Window size used when a request does not specify `limit`.
pub const DEFAULT_LIMIT: u32 = 100;

// ─── Stored message ──────────────────────────────────────────────────────────

/// A persisted chat message. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id:           i64,
  pub chat_type:    String,
  pub sender_login: String,
  pub sender_name:  String,
  pub message_text: String,
  pub created_at:   DateTime<Utc>,
}

// ─── Append input ────────────────────────────────────────────────────────────

/// A validated message waiting to be appended.
///
/// Only obtainable through [`NewChatMessage::new`], which guarantees a
/// non-blank sender login and message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
  chat_type:    String,
  sender_login: String,
  sender_name:  String,
  message_text: String,
}

impl NewChatMessage {
  /// Validate and normalise raw request fields.
  ///
  /// `message_text` and `sender_login` are trimmed and must be non-empty
  /// afterwards. A missing or blank `chat_type` falls back to
  /// [`DEFAULT_CHANNEL`]. `sender_name` is stored as given; it is not checked
  /// against the user directory.
  pub fn new(
    chat_type: Option<&str>,
    sender_login: &str,
    sender_name: Option<&str>,
    message_text: &str,
  ) -> Result<Self> {
    let sender_login = sender_login.trim();
    let message_text = message_text.trim();
    if sender_login.is_empty() || message_text.is_empty() {
      return Err(Error::MessageRequired);
    }

    Ok(Self {
      chat_type:    channel_or_default(chat_type),
      sender_login: sender_login.to_owned(),
      sender_name:  sender_name.unwrap_or_default().to_owned(),
      message_text: message_text.to_owned(),
    })
  }

  pub fn chat_type(&self) -> &str { &self.chat_type }

  pub fn sender_login(&self) -> &str { &self.sender_login }

  pub fn sender_name(&self) -> &str { &self.sender_name }

  pub fn message_text(&self) -> &str { &self.message_text }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`SchoolStore::list_messages`](crate::store::SchoolStore::list_messages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatQuery {
  pub chat_type: String,
  /// Maximum number of messages returned; the newest `limit` are kept.
  pub limit:     u32,
}

impl Default for ChatQuery {
  fn default() -> Self {
    Self { chat_type: DEFAULT_CHANNEL.to_owned(), limit: DEFAULT_LIMIT }
  }
}

impl ChatQuery {
  /// Build a query from raw `type` and `limit` query-string values.
  pub fn from_params(chat_type: Option<&str>, limit: Option<&str>) -> Result<Self> {
    let limit = match limit.map(str::trim) {
      None | Some("") => DEFAULT_LIMIT,
      Some(raw) => raw.parse().map_err(|_| Error::invalid("limit", raw))?,
    };
    Ok(Self { chat_type: channel_or_default(chat_type), limit })
  }
}

fn channel_or_default(chat_type: Option<&str>) -> String {
  match chat_type.map(str::trim) {
    Some(t) if !t.is_empty() => t.to_owned(),
    _ => DEFAULT_CHANNEL.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn message_text_is_trimmed() {
    let msg = NewChatMessage::new(Some("school"), "jdoe", Some("J. Doe"), "  hi  ").unwrap();
    assert_eq!(msg.message_text(), "hi");
    assert_eq!(msg.sender_login(), "jdoe");
  }

  #[test]
  fn blank_message_is_rejected() {
    let err = NewChatMessage::new(None, "jdoe", None, "   ").unwrap_err();
    assert_eq!(err, Error::MessageRequired);
  }

  #[test]
  fn empty_sender_is_rejected() {
    let err = NewChatMessage::new(None, "", None, "hi").unwrap_err();
    assert_eq!(err, Error::MessageRequired);
  }

  #[test]
  fn missing_channel_defaults_to_school() {
    let msg = NewChatMessage::new(None, "jdoe", None, "hi").unwrap();
    assert_eq!(msg.chat_type(), DEFAULT_CHANNEL);
    assert_eq!(msg.sender_name(), "");

    let msg = NewChatMessage::new(Some("  "), "jdoe", None, "hi").unwrap();
    assert_eq!(msg.chat_type(), DEFAULT_CHANNEL);
  }

  #[test]
  fn query_defaults() {
    let q = ChatQuery::from_params(None, None).unwrap();
    assert_eq!(q, ChatQuery::default());
    assert_eq!(q.limit, 100);
  }

  #[test]
  fn query_parses_limit_and_channel() {
    let q = ChatQuery::from_params(Some("teacher_7"), Some("10")).unwrap();
    assert_eq!(q.chat_type, "teacher_7");
    assert_eq!(q.limit, 10);
  }

  #[test]
  fn query_rejects_non_numeric_limit() {
    let err = ChatQuery::from_params(None, Some("ten")).unwrap_err();
    assert_eq!(err, Error::invalid("limit", "ten"));
    assert!(ChatQuery::from_params(None, Some("-1")).is_err());
  }
}
