//! Execution gateway
//!
//! Runs validated SQL against the relational store (SQLite).
//!
//! ## Architecture
//!
//! - `db.rs` — SqlStore, connection handling, statement execution
//! - `result.rs` — RowSet / ExecutionResult, the `ExecutionGateway` trait
//! - `schema.rs` — table/column introspection, column stats, prompt rendering

pub mod db;
pub mod result;
pub mod schema;

pub use db::SqlStore;
pub use result::{ExecutionGateway, ExecutionResult, Row, RowSet};
pub use schema::{render_schema_context, ColumnSchema, ColumnStats, NumericStats, TableSchema};
