//! Error type for `skylog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] skylog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// No database connection is configured; the write cannot proceed.
  #[error("store is not available")]
  Unavailable,

  /// An upsert was attempted without the external-provider identifier.
  #[error("user open id is required for upsert")]
  MissingOpenId,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
