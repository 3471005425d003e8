//! User accounts and the fixed set of roles.
//!
//! Creating a [`Role::Student`] provisions a quota ledger row as part of the
//! same unit of work; see [`crate::quota`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Value recorded in `created_by` when the request does not name a creator.
pub const DEFAULT_CREATED_BY: &str = "admin";

/// The role a user account holds.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  #[default]
  Student,
}

/// A stored user account, including internal bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:           i64,
  pub login:        String,
  pub display_name: String,
  pub role:         Role,
  /// School grade; only meaningful for students.
  pub grade:        Option<i64>,
  pub created_by:   String,
  pub created_at:   DateTime<Utc>,
}

/// The public projection of a [`User`] returned by directory listings.
///
/// `created_by` is internal and never leaves the store through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
  pub id:           i64,
  pub login:        String,
  pub display_name: String,
  pub role:         Role,
  pub grade:        Option<i64>,
  pub created_at:   DateTime<Utc>,
}

impl From<User> for UserSummary {
  fn from(u: User) -> Self {
    Self {
      id:           u.id,
      login:        u.login,
      display_name: u.display_name,
      role:         u.role,
      grade:        u.grade,
      created_at:   u.created_at,
    }
  }
}

// ─── Create input ────────────────────────────────────────────────────────────

/// A validated user-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
  login:        String,
  display_name: String,
  role:         Role,
  grade:        Option<i64>,
  created_by:   String,
}

impl NewUser {
  /// Validate and normalise raw request fields.
  ///
  /// `login` and `display_name` are trimmed and must be non-empty. A missing
  /// or blank `role` means [`Role::Student`]; any other value must name one of
  /// the fixed roles.
  pub fn new(
    login: &str,
    display_name: &str,
    role: Option<&str>,
    grade: Option<i64>,
    created_by: Option<&str>,
  ) -> Result<Self> {
    let login = login.trim();
    let display_name = display_name.trim();
    if login.is_empty() || display_name.is_empty() {
      return Err(Error::LoginRequired);
    }

    let role = match role.map(str::trim) {
      None | Some("") => Role::default(),
      Some(raw) => raw.parse::<Role>().map_err(|_| Error::UnknownRole(raw.to_owned()))?,
    };

    let created_by = match created_by.map(str::trim) {
      Some(c) if !c.is_empty() => c.to_owned(),
      _ => DEFAULT_CREATED_BY.to_owned(),
    };

    Ok(Self {
      login: login.to_owned(),
      display_name: display_name.to_owned(),
      role,
      grade,
      created_by,
    })
  }

  pub fn login(&self) -> &str { &self.login }

  pub fn display_name(&self) -> &str { &self.display_name }

  pub fn role(&self) -> Role { self.role }

  pub fn grade(&self) -> Option<i64> { self.grade }

  pub fn created_by(&self) -> &str { &self.created_by }

  /// Whether creating this user must also provision a quota ledger row.
  pub fn provisions_quota(&self) -> bool { self.role == Role::Student }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_student_created_by_admin() {
    let u = NewUser::new(" s1 ", " S One ", None, Some(5), None).unwrap();
    assert_eq!(u.login(), "s1");
    assert_eq!(u.display_name(), "S One");
    assert_eq!(u.role(), Role::Student);
    assert_eq!(u.created_by(), DEFAULT_CREATED_BY);
    assert!(u.provisions_quota());
  }

  #[test]
  fn blank_login_or_display_name_is_rejected() {
    assert_eq!(
      NewUser::new("", "x", None, None, None).unwrap_err(),
      Error::LoginRequired
    );
    assert_eq!(
      NewUser::new("a", "", None, None, None).unwrap_err(),
      Error::LoginRequired
    );
    assert_eq!(
      NewUser::new("   ", "x", None, None, None).unwrap_err(),
      Error::LoginRequired
    );
  }

  #[test]
  fn admin_and_teacher_do_not_provision_quota() {
    let admin = NewUser::new("a1", "Admin", Some("admin"), None, None).unwrap();
    assert_eq!(admin.role(), Role::Admin);
    assert!(!admin.provisions_quota());

    let teacher = NewUser::new("t1", "Teacher", Some("teacher"), None, Some("a1")).unwrap();
    assert!(!teacher.provisions_quota());
    assert_eq!(teacher.created_by(), "a1");
  }

  #[test]
  fn unknown_role_is_rejected() {
    let err = NewUser::new("x", "X", Some("janitor"), None, None).unwrap_err();
    assert_eq!(err, Error::UnknownRole("janitor".into()));
  }

  #[test]
  fn role_wire_format_is_lowercase() {
    assert_eq!(Role::Teacher.as_ref(), "teacher");
    assert_eq!(Role::Student.to_string(), "student");
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
  }
}
