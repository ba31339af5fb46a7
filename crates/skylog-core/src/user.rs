//! User — the identity record behind every owned resource.
//!
//! Users are created or refreshed on each successful external sign-in and
//! never deleted by this layer. The external-provider `open_id` is the
//! uniqueness key for the upsert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorisation role attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

/// A persisted identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  /// Surrogate key assigned by the store.
  pub id:             i64,
  /// External-provider identifier; unique across all users.
  pub open_id:        String,
  pub name:           Option<String>,
  pub email:          Option<String>,
  pub login_method:   Option<String>,
  pub role:           Role,
  pub created_at:     DateTime<Utc>,
  /// Refreshed by the store on any mutation of the row.
  pub updated_at:     DateTime<Utc>,
  pub last_signed_in: DateTime<Utc>,
}

/// Partial user input for [`TelemetryStore::upsert_user`][crate::store::TelemetryStore::upsert_user].
///
/// `None` fields are left untouched on an existing row and defaulted on a
/// fresh insert. `open_id` is mandatory; stores reject an empty value.
#[derive(Debug, Clone, Default)]
pub struct UserUpsert {
  pub open_id:        String,
  pub name:           Option<String>,
  pub email:          Option<String>,
  pub login_method:   Option<String>,
  pub last_signed_in: Option<DateTime<Utc>>,
  pub role:           Option<Role>,
}

impl UserUpsert {
  pub fn new(open_id: impl Into<String>) -> Self {
    Self {
      open_id: open_id.into(),
      ..Self::default()
    }
  }
}
