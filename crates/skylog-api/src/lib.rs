//! Remote-procedure layer for Skylog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`skylog_core::store::TelemetryStore`]. Procedure names are literal route
//! paths under `/api` (e.g. `/api/flightTests.getById`), preserving the
//! caller-visible contract: queries without input are `GET`, everything with
//! an input payload is `POST` with a JSON body.
//!
//! Each procedure validates its input shape through [`Input`] before any
//! store access, and declares its auth requirement through the extractors in
//! [`session`]: [`CurrentUser`] for protected procedures, [`MaybeUser`] for
//! public ones.

pub mod auth;
pub mod data_points;
pub mod error;
pub mod health;
pub mod input;
pub mod parameters;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use skylog_core::store::TelemetryStore;

pub use error::ApiError;
pub use input::Input;
pub use session::{CurrentUser, MaybeUser, SessionKey};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all procedure handlers.
#[derive(Clone)]
pub struct AppState<S: TelemetryStore> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionKey>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the procedure router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/api/health", get(health::handler))
    // auth
    .route("/api/auth.me", get(auth::me::<S>))
    .route("/api/auth.logout", post(auth::logout))
    // flight tests
    .route("/api/flightTests.list", get(flight_tests::list::<S>))
    .route("/api/flightTests.getById", post(flight_tests::get_by_id::<S>))
    .route("/api/flightTests.create", post(flight_tests::create::<S>))
    .route("/api/flightTests.update", post(flight_tests::update::<S>))
    .route("/api/flightTests.delete", post(flight_tests::delete::<S>))
    // parameters
    .route("/api/parameters.list", get(parameters::list::<S>))
    .route("/api/parameters.create", post(parameters::create::<S>))
    // data points
    .route(
      "/api/dataPoints.getByFlightTest",
      post(data_points::get_by_flight_test::<S>),
    )
    .route("/api/dataPoints.create", post(data_points::create::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
