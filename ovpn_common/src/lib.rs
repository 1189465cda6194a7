//!
//! Common types shared by the OpenVPN stats agent.
//!
//! This crate aggregates:
//! - `error` — unified error type `CollectorError` used across the workspace.
//! - `result` — handy `Result<T, CollectorError>` alias.
//! - `snapshot` — per-client `Snapshot` and `ClientRecord` types, including
//!   the counter accumulation rule applied on every poll.
//! - `envelope` — the JSON envelope expected by the monitoring host's
//!   SNMP extend mechanism.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod snapshot;
pub mod envelope;

pub use error::CollectorError;
pub use result::Result;
pub use snapshot::{ClientRecord, Snapshot};
