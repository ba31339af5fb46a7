//! [`SqliteStore`] — the SQLite implementation of [`TelemetryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use skylog_core::{
  data_point::{DataPointRow, NewDataPoint},
  flight_test::{FlightTest, FlightTestPatch, NewFlightTest},
  parameter::{NewParameter, Parameter},
  store::{DEFAULT_DATA_POINT_LIMIT, OwnerId, TelemetryStore},
  user::{User, UserUpsert},
};

use crate::{
  Error, Result,
  encode::{
    RawDataPointRow, RawFlightTest, RawParameter, RawUser, encode_dt,
    encode_role, encode_status,
  },
  schema::SCHEMA,
};

/// Rows per chunk for the bulk data-point insert. Bounds the size of any
/// single write without holding one transaction across the whole upload.
const INSERT_BATCH_SIZE: usize = 1000;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Skylog telemetry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. A store
/// built with [`SqliteStore::unconfigured`] holds no connection at all:
/// reads resolve to empty results with a warning log, writes fail with
/// [`Error::Unavailable`].
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: Option<tokio_rusqlite::Connection>,
  /// External identifier that is promoted to `admin` on upsert when no
  /// explicit role is supplied.
  owner_open_id:   Option<String>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn: Some(conn), owner_open_id: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn: Some(conn), owner_open_id: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// A store with no backing database. Reads are empty, writes fail.
  pub fn unconfigured() -> Self {
    Self { conn: None, owner_open_id: None }
  }

  /// Configure the owner open id for the admin-promotion upsert rule.
  pub fn with_owner_open_id(mut self, open_id: Option<String>) -> Self {
    self.owner_open_id = open_id;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    let conn = self.write_conn()?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Connection for a read; `None` logs the degraded state.
  fn read_conn(&self) -> Option<&tokio_rusqlite::Connection> {
    if self.conn.is_none() {
      tracing::warn!("store unavailable; read resolves to empty");
    }
    self.conn.as_ref()
  }

  /// Connection for a write; absence is an error.
  fn write_conn(&self) -> Result<&tokio_rusqlite::Connection> {
    match self.conn.as_ref() {
      Some(conn) => Ok(conn),
      None => {
        tracing::warn!("store unavailable; write rejected");
        Err(Error::Unavailable)
      }
    }
  }
}

// ─── Row mapping helpers ─────────────────────────────────────────────────────

fn flight_test_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFlightTest> {
  Ok(RawFlightTest {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    test_date:   row.get(3)?,
    aircraft:    row.get(4)?,
    status:      row.get(5)?,
    created_by:  row.get(6)?,
    created_at:  row.get(7)?,
    updated_at:  row.get(8)?,
  })
}

const FLIGHT_TEST_COLUMNS: &str =
  "id, name, description, test_date, aircraft, status, created_by, created_at, updated_at";

// ─── TelemetryStore impl ─────────────────────────────────────────────────────

impl TelemetryStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  fn user_by_open_id(
    &self,
    open_id: &str,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_ {
    let open_id = open_id.to_owned();
    async move {
      let Some(conn) = self.read_conn() else {
        return Ok(None);
      };

      let raw: Option<RawUser> = conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, open_id, name, email, login_method, role,
                        created_at, updated_at, last_signed_in
                 FROM users WHERE open_id = ?1",
                rusqlite::params![open_id],
                |row| {
                  Ok(RawUser {
                    id:             row.get(0)?,
                    open_id:        row.get(1)?,
                    name:           row.get(2)?,
                    email:          row.get(3)?,
                    login_method:   row.get(4)?,
                    role:           row.get(5)?,
                    created_at:     row.get(6)?,
                    updated_at:     row.get(7)?,
                    last_signed_in: row.get(8)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?;

      raw.map(RawUser::into_user).transpose()
    }
  }

  async fn upsert_user(&self, user: UserUpsert) -> Result<()> {
    if user.open_id.is_empty() {
      return Err(Error::MissingOpenId);
    }
    let conn = self.write_conn()?;
    let now_str = encode_dt(Utc::now());

    // Insert column list and the conflict-update assignment list are built
    // from the supplied fields only; untouched columns keep their values on
    // an existing row.
    let mut cols: Vec<&'static str> = vec!["open_id"];
    let mut vals: Vec<Value> = vec![user.open_id.clone().into()];
    let mut updates: Vec<&'static str> = Vec::new();

    if let Some(name) = user.name {
      cols.push("name");
      vals.push(name.into());
      updates.push("name = excluded.name");
    }
    if let Some(email) = user.email {
      cols.push("email");
      vals.push(email.into());
      updates.push("email = excluded.email");
    }
    if let Some(method) = user.login_method {
      cols.push("login_method");
      vals.push(method.into());
      updates.push("login_method = excluded.login_method");
    }

    cols.push("last_signed_in");
    match user.last_signed_in {
      Some(ts) => {
        vals.push(encode_dt(ts).into());
        updates.push("last_signed_in = excluded.last_signed_in");
      }
      // Insert-side default; only written on update if nothing else is.
      None => vals.push(now_str.clone().into()),
    }

    match user.role {
      Some(role) => {
        cols.push("role");
        vals.push(encode_role(role).to_owned().into());
        updates.push("role = excluded.role");
      }
      None if self.owner_open_id.as_deref() == Some(user.open_id.as_str()) => {
        cols.push("role");
        vals.push("admin".to_owned().into());
        updates.push("role = excluded.role");
      }
      None => {}
    }

    // An upsert must always be observable: with no other update, stamp
    // last_signed_in with the current time.
    if updates.is_empty() {
      updates.push("last_signed_in = excluded.last_signed_in");
    }

    cols.push("created_at");
    vals.push(now_str.clone().into());
    cols.push("updated_at");
    vals.push(now_str.into());
    updates.push("updated_at = excluded.updated_at");

    let placeholders = (1..=vals.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "INSERT INTO users ({}) VALUES ({placeholders})
       ON CONFLICT(open_id) DO UPDATE SET {}",
      cols.join(", "),
      updates.join(", "),
    );

    conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(vals))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Flight tests (owner-scoped) ───────────────────────────────────────────

  async fn list_flight_tests(&self, owner: OwnerId) -> Result<Vec<FlightTest>> {
    let Some(conn) = self.read_conn() else {
      return Ok(Vec::new());
    };

    let raws: Vec<RawFlightTest> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FLIGHT_TEST_COLUMNS} FROM flight_tests
           WHERE created_by = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner.0], flight_test_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawFlightTest::into_flight_test)
      .collect()
  }

  async fn flight_test(&self, id: i64, owner: OwnerId) -> Result<Option<FlightTest>> {
    let Some(conn) = self.read_conn() else {
      return Ok(None);
    };

    let raw: Option<RawFlightTest> = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FLIGHT_TEST_COLUMNS} FROM flight_tests
                 WHERE id = ?1 AND created_by = ?2"
              ),
              rusqlite::params![id, owner.0],
              flight_test_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFlightTest::into_flight_test).transpose()
  }

  async fn create_flight_test(&self, data: NewFlightTest, owner: OwnerId) -> Result<i64> {
    let conn = self.write_conn()?;
    let now_str = encode_dt(Utc::now());
    let test_date_str = encode_dt(data.test_date);
    let status_str = encode_status(data.status).to_owned();

    let id = conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO flight_tests (
             name, description, test_date, aircraft, status,
             created_by, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            data.name,
            data.description,
            test_date_str,
            data.aircraft,
            status_str,
            owner.0,
            now_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn update_flight_test(
    &self,
    id: i64,
    patch: FlightTestPatch,
    owner: OwnerId,
  ) -> Result<()> {
    let conn = self.write_conn()?;

    let mut sets: Vec<String> = Vec::new();
    let mut vals: Vec<Value> = Vec::new();

    if let Some(name) = patch.name {
      vals.push(name.into());
      sets.push(format!("name = ?{}", vals.len()));
    }
    if let Some(description) = patch.description {
      vals.push(description.into());
      sets.push(format!("description = ?{}", vals.len()));
    }
    if let Some(test_date) = patch.test_date {
      vals.push(encode_dt(test_date).into());
      sets.push(format!("test_date = ?{}", vals.len()));
    }
    if let Some(aircraft) = patch.aircraft {
      vals.push(aircraft.into());
      sets.push(format!("aircraft = ?{}", vals.len()));
    }
    if let Some(status) = patch.status {
      vals.push(encode_status(status).to_owned().into());
      sets.push(format!("status = ?{}", vals.len()));
    }

    // Always refresh updated_at, even for an empty patch.
    vals.push(encode_dt(Utc::now()).into());
    sets.push(format!("updated_at = ?{}", vals.len()));

    vals.push(id.into());
    let id_pos = vals.len();
    vals.push(owner.0.into());
    let owner_pos = vals.len();

    // Ownership mismatch matches zero rows; the caller sees plain success.
    let sql = format!(
      "UPDATE flight_tests SET {} WHERE id = ?{id_pos} AND created_by = ?{owner_pos}",
      sets.join(", "),
    );

    conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(vals))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_flight_test(&self, id: i64, owner: OwnerId) -> Result<()> {
    let conn = self.write_conn()?;

    // Data points go with the flight test via ON DELETE CASCADE.
    conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM flight_tests WHERE id = ?1 AND created_by = ?2",
          rusqlite::params![id, owner.0],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Parameters (global) ───────────────────────────────────────────────────

  async fn list_parameters(&self) -> Result<Vec<Parameter>> {
    let Some(conn) = self.read_conn() else {
      return Ok(Vec::new());
    };

    let raws: Vec<RawParameter> = conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, unit, description, parameter_type, created_at
           FROM parameters",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawParameter {
              id:             row.get(0)?,
              name:           row.get(1)?,
              unit:           row.get(2)?,
              description:    row.get(3)?,
              parameter_type: row.get(4)?,
              created_at:     row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParameter::into_parameter).collect()
  }

  async fn create_parameter(&self, data: NewParameter) -> Result<i64> {
    let conn = self.write_conn()?;
    let now_str = encode_dt(Utc::now());

    let id = conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO parameters (name, unit, description, parameter_type, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            data.name,
            data.unit,
            data.description,
            data.parameter_type,
            now_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  // ── Data points ───────────────────────────────────────────────────────────

  async fn data_points(
    &self,
    flight_test_id: i64,
    limit: Option<usize>,
  ) -> Result<Vec<DataPointRow>> {
    let Some(conn) = self.read_conn() else {
      return Ok(Vec::new());
    };
    let limit = limit.unwrap_or(DEFAULT_DATA_POINT_LIMIT) as i64;

    let raws: Vec<RawDataPointRow> = conn
      .call(move |conn| {
        // LEFT JOIN: rows survive a parameter definition removed
        // out-of-band; name/unit come back NULL.
        let mut stmt = conn.prepare(
          "SELECT d.id, d.timestamp, d.value, d.parameter_id, p.name, p.unit
           FROM data_points d
           LEFT JOIN parameters p ON p.id = d.parameter_id
           WHERE d.flight_test_id = ?1
           ORDER BY d.id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![flight_test_id, limit], |row| {
            Ok(RawDataPointRow {
              id:             row.get(0)?,
              timestamp:      row.get(1)?,
              value:          row.get(2)?,
              parameter_id:   row.get(3)?,
              parameter_name: row.get(4)?,
              parameter_unit: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDataPointRow::into_row).collect()
  }

  /// Chunked bulk insert. Each chunk of [`INSERT_BATCH_SIZE`] rows commits
  /// in its own transaction; a failure after chunk *k* leaves chunks
  /// `1..=k` committed and the remainder absent. Callers must treat a
  /// failed upload as at-least-partially-applied.
  async fn insert_data_points(&self, points: Vec<NewDataPoint>) -> Result<()> {
    let conn = self.write_conn()?;

    let mut queue = points;
    while !queue.is_empty() {
      let tail = queue.split_off(queue.len().min(INSERT_BATCH_SIZE));
      let chunk = std::mem::replace(&mut queue, tail);

      let now_str = encode_dt(Utc::now());
      let rows: Vec<(i64, i64, String, String, String)> = chunk
        .into_iter()
        .map(|p| {
          (
            p.flight_test_id,
            p.parameter_id,
            encode_dt(p.timestamp),
            p.value,
            now_str.clone(),
          )
        })
        .collect();

      conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          {
            let mut stmt = tx.prepare(
              "INSERT INTO data_points
                 (flight_test_id, parameter_id, timestamp, value, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (test_id, param_id, ts, value, created_at) in rows {
              stmt.execute(rusqlite::params![
                test_id, param_id, ts, value, created_at
              ])?;
            }
          }
          tx.commit()?;
          Ok(())
        })
        .await?;
    }

    Ok(())
  }
}
