//! [`SqliteStore`], the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};

use campus_core::{
  catalog::{NewSubject, Subject, SubjectFilter},
  chat::{ChatMessage, ChatQuery, NewChatMessage},
  quota::{DEFAULT_DAILY_LIMIT_MINUTES, QuotaLedger},
  store::SchoolStore,
  user::{NewUser, User, UserSummary},
};

use crate::{
  encode::{
    RawChatMessage, RawUser, RawUserSummary, encode_dt, encode_role, subject_from_row,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Campus store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Each
/// operation checks the connection out for the duration of one closure and
/// hands it back when the closure returns, whatever the outcome.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `work` inside a single write transaction.
  ///
  /// The transaction is `IMMEDIATE`, so the write lock is taken before the
  /// first statement. It is committed only if `work` succeeds; on any error
  /// the guard is dropped uncommitted and SQLite rolls everything back.
  async fn unit_of_work<T, F>(&self, work: F) -> tokio_rusqlite::Result<T>
  where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = work(&tx)?;
        tx.commit()?;
        Ok(out)
      })
      .await
  }

  /// Add a subject to the catalog.
  ///
  /// The catalog is read-only through the request gateway; this is the
  /// ingest path used to seed it.
  pub async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let NewSubject { name, grade, quarter, description } = input;

    let subject = self
      .unit_of_work(move |tx| {
        tx.execute(
          "INSERT INTO subjects (name, grade, quarter, description) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, grade, quarter, description],
        )?;
        Ok(Subject { id: tx.last_insert_rowid(), name, grade, quarter, description })
      })
      .await?;

    Ok(subject)
  }
}

/// `true` if `err` is SQLite rejecting a write on a UNIQUE constraint.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Chat ──────────────────────────────────────────────────────────────────

  async fn append_message(&self, input: NewChatMessage) -> Result<ChatMessage> {
    let chat_type    = input.chat_type().to_owned();
    let sender_login = input.sender_login().to_owned();
    let sender_name  = input.sender_name().to_owned();
    let message_text = input.message_text().to_owned();
    let now_str      = encode_dt(Utc::now());

    tracing::debug!(chat_type = %chat_type, sender = %sender_login, "appending chat message");

    let raw: RawChatMessage = self
      .unit_of_work(move |tx| {
        // Never stamp a message earlier than the newest one in its channel,
        // even if the wall clock stepped backwards.
        let newest: Option<String> = tx.query_row(
          "SELECT MAX(created_at) FROM chat_messages WHERE chat_type = ?1",
          rusqlite::params![chat_type],
          |r| r.get(0),
        )?;
        let created_at = match newest {
          Some(n) if n > now_str => n,
          _ => now_str,
        };

        tx.execute(
          "INSERT INTO chat_messages (chat_type, sender_login, sender_name, message_text, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![chat_type, sender_login, sender_name, message_text, created_at],
        )?;

        Ok(RawChatMessage {
          id: tx.last_insert_rowid(),
          chat_type,
          sender_login,
          sender_name,
          message_text,
          created_at,
        })
      })
      .await?;

    raw.into_message()
  }

  async fn list_messages(&self, query: ChatQuery) -> Result<Vec<ChatMessage>> {
    let ChatQuery { chat_type, limit } = query;

    let raws: Vec<RawChatMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, chat_type, sender_login, sender_name, message_text, created_at
           FROM chat_messages
           WHERE chat_type = ?1
           ORDER BY created_at DESC, id DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![chat_type, limit], RawChatMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Fetched newest-first to apply the window; callers get oldest-first.
    raws.into_iter().rev().map(RawChatMessage::into_message).collect()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn list_users(&self) -> Result<Vec<UserSummary>> {
    let raws: Vec<RawUserSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, login, display_name, role, grade, created_at
           FROM users
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], RawUserSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUserSummary::into_summary).collect()
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let provisions   = input.provisions_quota();
    let login        = input.login().to_owned();
    let display_name = input.display_name().to_owned();
    let role_str     = encode_role(input.role()).to_owned();
    let grade        = input.grade();
    let created_by   = input.created_by().to_owned();
    let created_at   = encode_dt(Utc::now());

    tracing::debug!(login = %login, role = %role_str, "creating user");

    let login_for_err = login.clone();
    let (raw, provisioned) = self
      .unit_of_work(move |tx| {
        tx.execute(
          "INSERT INTO users (login, display_name, role, grade, created_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![login, display_name, role_str, grade, created_by, created_at],
        )?;
        let id = tx.last_insert_rowid();

        // Insert-if-absent: a pre-existing, possibly customised limit wins.
        let provisioned = if provisions {
          tx.execute(
            "INSERT INTO student_time_limits (student_login, daily_limit_minutes)
             VALUES (?1, ?2)
             ON CONFLICT (student_login) DO NOTHING",
            rusqlite::params![login, DEFAULT_DAILY_LIMIT_MINUTES],
          )? > 0
        } else {
          false
        };

        let raw = RawUser {
          id,
          login,
          display_name,
          role: role_str,
          grade,
          created_by,
          created_at,
        };
        Ok((raw, provisioned))
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::LoginTaken(login_for_err)
        } else {
          Error::Database(e)
        }
      })?;

    if provisioned {
      tracing::info!(login = %raw.login, "provisioned quota ledger for new student");
    }

    raw.into_user()
  }

  async fn quota_for(&self, login: String) -> Result<Option<QuotaLedger>> {
    let ledger = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT student_login, daily_limit_minutes
             FROM student_time_limits
             WHERE student_login = ?1",
            rusqlite::params![login],
            |row| {
              Ok(QuotaLedger {
                student_login:       row.get(0)?,
                daily_limit_minutes: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(ledger)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn filter_subjects(&self, filter: SubjectFilter) -> Result<Vec<Subject>> {
    let SubjectFilter { grade, quarter } = filter;

    let subjects = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, grade, quarter, description
           FROM subjects
           WHERE (?1 IS NULL OR grade = ?1)
             AND (?2 IS NULL OR quarter = ?2)
           ORDER BY grade, quarter, name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![grade, quarter], subject_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(subjects)
  }
}
