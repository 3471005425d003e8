//! The per-student daily usage allowance.
//!
//! A ledger row is created when a student account is provisioned. Creation is
//! insert-if-absent: an existing row, possibly customised by an administrator,
//! is never overwritten.

use serde::{Deserialize, Serialize};

/// Allowance given to a freshly provisioned student, in minutes per day.
pub const DEFAULT_DAILY_LIMIT_MINUTES: i64 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLedger {
  pub student_login:       String,
  pub daily_limit_minutes: i64,
}
