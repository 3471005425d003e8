//! The read-only subject catalog.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A subject taught in a given grade and quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          i64,
  pub name:        String,
  pub grade:       i64,
  pub quarter:     i64,
  pub description: Option<String>,
}

/// Catalog ingest input; not reachable through the request gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
  pub name:        String,
  pub grade:       i64,
  pub quarter:     i64,
  pub description: Option<String>,
}

/// Filter for [`SchoolStore::filter_subjects`](crate::store::SchoolStore::filter_subjects).
/// Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectFilter {
  pub grade:   Option<i64>,
  pub quarter: Option<i64>,
}

impl SubjectFilter {
  /// Build a filter from raw `grade` and `quarter` query-string values.
  /// Blank values are treated as absent.
  pub fn from_params(grade: Option<&str>, quarter: Option<&str>) -> Result<Self> {
    Ok(Self {
      grade:   parse_level("grade", grade)?,
      quarter: parse_level("quarter", quarter)?,
    })
  }
}

fn parse_level(name: &'static str, raw: Option<&str>) -> Result<Option<i64>> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(v) => v
      .parse::<u32>()
      .map(|n| Some(i64::from(n)))
      .map_err(|_| Error::invalid(name, v)),
  }
}
