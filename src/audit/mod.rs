//! Audit trail (one record per pipeline run)
//!
//! - `record.rs` — AuditEntry (what a run reports) and AuditRecord (what is stored)
//! - `logger.rs` — per-day NDJSON partitions, serialized appends

pub mod logger;
pub mod record;

pub use logger::{partition_file_name, AuditLogger};
pub use record::{AuditEntry, AuditRecord};
