//! `dataPoints.*` procedures.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use skylog_core::{
  data_point::{DataPointRow, NewDataPoint},
  store::{OwnerId, TelemetryStore},
};

use crate::{AppState, CurrentUser, Input, error::ApiError};

// ─── Get by flight test ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetByFlightTestInput {
  pub flight_test_id: i64,
  pub limit:          Option<usize>,
}

/// `POST /api/dataPoints.getByFlightTest`
///
/// Does not re-verify that `flightTestId` belongs to the caller; ownership
/// is resolved by whichever call previously fetched the flight test.
pub async fn get_by_flight_test<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_): CurrentUser,
  Input(input): Input<GetByFlightTestInput>,
) -> Result<Json<Vec<DataPointRow>>, ApiError>
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  let rows = state
    .store
    .data_points(input.flight_test_id, input.limit)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// A sample value as uploaded: either already text, or a JSON number kept
/// as its textual form. Values are never coerced to a numeric type here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
  Text(String),
  Number(serde_json::Number),
}

impl SampleValue {
  fn into_text(self) -> String {
    match self {
      Self::Text(s) => s,
      Self::Number(n) => n.to_string(),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInput {
  pub parameter_id: i64,
  pub timestamp:    DateTime<Utc>,
  pub value:        SampleValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInput {
  pub flight_test_id: i64,
  pub points:         Vec<PointInput>,
}

/// `POST /api/dataPoints.create` — the upload path.
///
/// Unlike the read side, this resolves the flight test under the caller's
/// identity first; uploading into another user's test is a 404. The write
/// itself is chunked and not atomic across chunks — a failed upload may be
/// partially applied.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Input(input): Input<CreateInput>,
) -> Result<Json<Value>, ApiError>
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  state
    .store
    .flight_test(input.flight_test_id, OwnerId::from(&user))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("flight test {} not found", input.flight_test_id))
    })?;

  let points: Vec<NewDataPoint> = input
    .points
    .into_iter()
    .map(|p| NewDataPoint {
      flight_test_id: input.flight_test_id,
      parameter_id:   p.parameter_id,
      timestamp:      p.timestamp,
      value:          p.value.into_text(),
    })
    .collect();
  let inserted = points.len();

  state
    .store
    .insert_data_points(points)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true, "inserted": inserted })))
}
