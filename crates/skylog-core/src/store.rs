//! The `TelemetryStore` trait and the owner-scoping newtype.
//!
//! The trait is implemented by storage backends (e.g. `skylog-store-sqlite`).
//! Higher layers (`skylog-api`, `skylog-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  data_point::{DataPointRow, NewDataPoint},
  flight_test::{FlightTest, FlightTestPatch, NewFlightTest},
  parameter::{NewParameter, Parameter},
  user::{User, UserUpsert},
};

/// Default row cap for [`TelemetryStore::data_points`].
pub const DEFAULT_DATA_POINT_LIMIT: usize = 1000;

// ─── Owner scoping ───────────────────────────────────────────────────────────

/// The acting user's id, as a distinct type.
///
/// Every owned-resource operation takes an `OwnerId` in its signature, so the
/// scoping filter cannot be forgotten at a call site. A flight test owned by
/// a different user is indistinguishable from a non-existent one.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct OwnerId(pub i64);

impl From<&User> for OwnerId {
  fn from(user: &User) -> Self {
    Self(user.id)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Skylog telemetry store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
///
/// A backend may be *unavailable* (no configured connection). In that state
/// reads resolve to empty/absent and writes fail with an unavailability
/// error; no operation may panic.
pub trait TelemetryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Look a user up by external-provider identifier. `None` if unknown.
  fn user_by_open_id(
    &self,
    open_id: &str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Insert-or-update keyed on `open_id`.
  ///
  /// Only explicitly supplied fields are written on an existing row. When
  /// nothing else changed and no explicit `last_signed_in` was given, the
  /// store stamps `last_signed_in` with the current time so repeated
  /// sign-ins stay observable.
  fn upsert_user(
    &self,
    user: UserUpsert,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Flight tests (owner-scoped) ───────────────────────────────────────

  /// All flight tests owned by `owner`, newest-created first.
  fn list_flight_tests(
    &self,
    owner: OwnerId,
  ) -> impl Future<Output = Result<Vec<FlightTest>, Self::Error>> + Send + '_;

  /// A single flight test; `None` when the id does not exist *or* belongs
  /// to a different owner.
  fn flight_test(
    &self,
    id: i64,
    owner: OwnerId,
  ) -> impl Future<Output = Result<Option<FlightTest>, Self::Error>> + Send + '_;

  /// Create a flight test owned by `owner`; returns the new id.
  fn create_flight_test(
    &self,
    data: NewFlightTest,
    owner: OwnerId,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Apply a partial update. Silently affects zero rows when `id` is not
  /// owned by `owner`.
  fn update_flight_test(
    &self,
    id: i64,
    patch: FlightTestPatch,
    owner: OwnerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a flight test and (via the storage layer) its data points.
  /// Silently affects zero rows when `id` is not owned by `owner`.
  fn delete_flight_test(
    &self,
    id: i64,
    owner: OwnerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Parameters (global) ───────────────────────────────────────────────

  fn list_parameters(
    &self,
  ) -> impl Future<Output = Result<Vec<Parameter>, Self::Error>> + Send + '_;

  /// Create a parameter definition; no uniqueness check on the name.
  fn create_parameter(
    &self,
    data: NewParameter,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Data points ───────────────────────────────────────────────────────

  /// Samples for one flight test, joined against parameter definitions.
  /// Capped at `limit` rows ([`DEFAULT_DATA_POINT_LIMIT`] when `None`).
  fn data_points(
    &self,
    flight_test_id: i64,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<DataPointRow>, Self::Error>> + Send + '_;

  /// Bulk insert in fixed-size chunks. NOT atomic across chunks: a failure
  /// partway through leaves earlier chunks committed.
  fn insert_data_points(
    &self,
    points: Vec<NewDataPoint>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
