//! The `SchoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `campus-store-sqlite`).
//! The request gateway depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  catalog::{Subject, SubjectFilter},
  chat::{ChatMessage, ChatQuery, NewChatMessage},
  quota::QuotaLedger,
  user::{NewUser, User, UserSummary},
};

/// Abstraction over the persistence backend.
///
/// Every method is one unit of work: it either commits completely or leaves
/// the store untouched. Concurrency control is the backend's job; callers
/// hold no locks.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Chat ──────────────────────────────────────────────────────────────

  /// Append a message to its channel and return it with the server-assigned
  /// `id` and `created_at`.
  ///
  /// `created_at` never goes backwards within a channel.
  fn append_message(
    &self,
    input: NewChatMessage,
  ) -> impl Future<Output = Result<ChatMessage, Self::Error>> + Send + '_;

  /// Return the newest `query.limit` messages of a channel, oldest first.
  fn list_messages(
    &self,
    query: ChatQuery,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// All users, most recently created first.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<UserSummary>, Self::Error>> + Send + '_;

  /// Create a user. For students, the quota ledger row is ensured in the
  /// same transaction as the user row.
  ///
  /// Fails if the login is already taken; in that case nothing is written.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up the quota ledger row for a login. Returns `None` if absent.
  fn quota_for(
    &self,
    login: String,
  ) -> impl Future<Output = Result<Option<QuotaLedger>, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Subjects matching `filter`, ordered by grade, quarter, then name.
  fn filter_subjects(
    &self,
    filter: SubjectFilter,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;
}
