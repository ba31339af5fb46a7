//! DataPoint — one time-series sample recorded against a flight test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for the bulk data-point insert.
///
/// The value is carried as text so heterogeneous numeric formats (integers,
/// floats, scientific notation) survive the write without lossy coercion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataPoint {
  pub flight_test_id: i64,
  pub parameter_id:   i64,
  pub timestamp:      DateTime<Utc>,
  pub value:          String,
}

/// A data point as read back for visualisation: joined against its
/// parameter definition. `parameter_name`/`parameter_unit` are absent when
/// the definition has been removed out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointRow {
  pub id:             i64,
  pub timestamp:      DateTime<Utc>,
  pub value:          String,
  pub parameter_id:   i64,
  pub parameter_name: Option<String>,
  pub parameter_unit: Option<String>,
}
