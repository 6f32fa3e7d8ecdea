//! assay-db - Database session layer for Assay
//!
//! This crate provides the `Database` trait, the DuckDB implementation, and
//! `open_session` which turns a connection configuration into a live session.

pub mod duckdb;
pub mod error;
mod row_helpers;
pub mod session;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use session::open_session;
pub use traits::{Database, QueryResult};
