//! Parameter — a named measurable quantity definition.
//!
//! Parameters are global: not owned by a user, readable by anyone, and never
//! updated or deleted by this layer. Duplicate names are permitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted parameter definition (e.g. altitude, airspeed, EGT).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
  pub id:             i64,
  pub name:           String,
  pub unit:           Option<String>,
  pub description:    Option<String>,
  /// Free-text category label, e.g. "engine" or "navigation".
  pub parameter_type: Option<String>,
  pub created_at:     DateTime<Utc>,
}

/// Input for creating a parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParameter {
  pub name:           String,
  pub unit:           Option<String>,
  pub description:    Option<String>,
  pub parameter_type: Option<String>,
}
