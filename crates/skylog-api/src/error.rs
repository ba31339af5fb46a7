//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by a procedure handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The payload does not match the procedure's input shape. Raised before
  /// any store access; always caller-fixable.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A protected procedure was invoked with no resolved identity.
  #[error("unauthenticated")]
  Unauthenticated,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthenticated => {
        (StatusCode::UNAUTHORIZED, "unauthenticated".to_owned())
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
