//! Core types and trait definitions for the Skylog flight-test data store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod data_point;
pub mod error;
pub mod parameter;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use store::OwnerId;
