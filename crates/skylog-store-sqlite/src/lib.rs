//! SQLite backend for the Skylog telemetry store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The store can also be constructed
//! without a database path, in which case reads degrade to empty results and
//! writes fail with [`Error::Unavailable`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
