//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so comparing two encoded timestamps as text gives the
//! same answer as comparing them as instants.

use campus_core::{
  catalog::Subject,
  chat::ChatMessage,
  user::{Role, User, UserSummary},
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.into() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse::<Role>().map_err(|_| Error::UnknownRole(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `chat_messages` row.
pub struct RawChatMessage {
  pub id:           i64,
  pub chat_type:    String,
  pub sender_login: String,
  pub sender_name:  String,
  pub message_text: String,
  pub created_at:   String,
}

impl RawChatMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      chat_type:    row.get(1)?,
      sender_login: row.get(2)?,
      sender_name:  row.get(3)?,
      message_text: row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<ChatMessage> {
    Ok(ChatMessage {
      id:           self.id,
      chat_type:    self.chat_type,
      sender_login: self.sender_login,
      sender_name:  self.sender_name,
      message_text: self.message_text,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:           i64,
  pub login:        String,
  pub display_name: String,
  pub role:         String,
  pub grade:        Option<i64>,
  pub created_by:   String,
  pub created_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           self.id,
      login:        self.login,
      display_name: self.display_name,
      role:         decode_role(&self.role)?,
      grade:        self.grade,
      created_by:   self.created_by,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values for the public user projection; `created_by` is never selected.
pub struct RawUserSummary {
  pub id:           i64,
  pub login:        String,
  pub display_name: String,
  pub role:         String,
  pub grade:        Option<i64>,
  pub created_at:   String,
}

impl RawUserSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      login:        row.get(1)?,
      display_name: row.get(2)?,
      role:         row.get(3)?,
      grade:        row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_summary(self) -> Result<UserSummary> {
    Ok(UserSummary {
      id:           self.id,
      login:        self.login,
      display_name: self.display_name,
      role:         decode_role(&self.role)?,
      grade:        self.grade,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// `subjects` rows need no decoding beyond column extraction.
pub fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    id:          row.get(0)?,
    name:        row.get(1)?,
    grade:       row.get(2)?,
    quarter:     row.get(3)?,
    description: row.get(4)?,
  })
}
