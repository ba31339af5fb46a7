//! The per-procedure input validator.
//!
//! Every procedure that accepts a payload declares a `Deserialize` input
//! struct and extracts it through [`Input`]. A body that fails to match the
//! declared shape — missing `id`, wrong type, not an object — becomes a
//! synchronous [`ApiError::InvalidInput`] rejection, before the handler body
//! (and therefore the store) is ever reached.

use axum::{
  Json,
  extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A validated procedure input.
pub struct Input<T>(pub T);

impl<T, S> FromRequest<S> for Input<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    Ok(Self(value))
  }
}
