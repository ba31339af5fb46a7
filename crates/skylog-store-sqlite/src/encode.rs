//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings
//! (microsecond precision, `Z` suffix) so that lexicographic column order
//! matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use skylog_core::{
  data_point::DataPointRow,
  flight_test::{FlightTest, FlightTestStatus},
  parameter::Parameter,
  user::{Role, User},
};

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

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Core(skylog_core::Error::UnknownRole(other.into()))),
  }
}

// ─── FlightTestStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: FlightTestStatus) -> &'static str {
  match s {
    FlightTestStatus::Draft => "draft",
    FlightTestStatus::InProgress => "in_progress",
    FlightTestStatus::Completed => "completed",
    FlightTestStatus::Archived => "archived",
  }
}

pub fn decode_status(s: &str) -> Result<FlightTestStatus> {
  match s {
    "draft" => Ok(FlightTestStatus::Draft),
    "in_progress" => Ok(FlightTestStatus::InProgress),
    "completed" => Ok(FlightTestStatus::Completed),
    "archived" => Ok(FlightTestStatus::Archived),
    other => Err(Error::Core(skylog_core::Error::UnknownStatus(other.into()))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:             i64,
  pub open_id:        String,
  pub name:           Option<String>,
  pub email:          Option<String>,
  pub login_method:   Option<String>,
  pub role:           String,
  pub created_at:     String,
  pub updated_at:     String,
  pub last_signed_in: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:             self.id,
      open_id:        self.open_id,
      name:           self.name,
      email:          self.email,
      login_method:   self.login_method,
      role:           decode_role(&self.role)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      last_signed_in: decode_dt(&self.last_signed_in)?,
    })
  }
}

/// Raw values read directly from a `flight_tests` row.
pub struct RawFlightTest {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub test_date:   String,
  pub aircraft:    Option<String>,
  pub status:      String,
  pub created_by:  i64,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawFlightTest {
  pub fn into_flight_test(self) -> Result<FlightTest> {
    Ok(FlightTest {
      id:          self.id,
      name:        self.name,
      description: self.description,
      test_date:   decode_dt(&self.test_date)?,
      aircraft:    self.aircraft,
      status:      decode_status(&self.status)?,
      created_by:  self.created_by,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `parameters` row.
pub struct RawParameter {
  pub id:             i64,
  pub name:           String,
  pub unit:           Option<String>,
  pub description:    Option<String>,
  pub parameter_type: Option<String>,
  pub created_at:     String,
}

impl RawParameter {
  pub fn into_parameter(self) -> Result<Parameter> {
    Ok(Parameter {
      id:             self.id,
      name:           self.name,
      unit:           self.unit,
      description:    self.description,
      parameter_type: self.parameter_type,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `data_points` row joined against `parameters`.
pub struct RawDataPointRow {
  pub id:             i64,
  pub timestamp:      String,
  pub value:          String,
  pub parameter_id:   i64,
  pub parameter_name: Option<String>,
  pub parameter_unit: Option<String>,
}

impl RawDataPointRow {
  pub fn into_row(self) -> Result<DataPointRow> {
    Ok(DataPointRow {
      id:             self.id,
      timestamp:      decode_dt(&self.timestamp)?,
      value:          self.value,
      parameter_id:   self.parameter_id,
      parameter_name: self.parameter_name,
      parameter_unit: self.parameter_unit,
    })
  }
}
