//! `parameters.*` procedures.
//!
//! Parameters are global: listing is public, creation requires an identity.
//! There is no update or delete.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use skylog_core::{parameter::{NewParameter, Parameter}, store::TelemetryStore};

use crate::{AppState, CurrentUser, Input, error::ApiError};

/// `GET /api/parameters.list`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Parameter>>, ApiError>
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  let parameters = state
    .store
    .list_parameters()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(parameters))
}

/// `POST /api/parameters.create` — no uniqueness check on the name.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_): CurrentUser,
  Input(input): Input<NewParameter>,
) -> Result<Json<Value>, ApiError>
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  let id = state
    .store
    .create_parameter(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "id": id })))
}
