//! Error types shared across the workspace.
//!
//! The `CollectorError` enum classifies every failure into one of three
//! terminal kinds. None of them is retried: each aborts the current poll
//! cycle, and the outer layer turns it into the failure envelope.
use thiserror::Error;

/// Unified error type for the stats agent.
///
/// Underlying I/O and codec errors are classified at the boundary where they
/// occur: the status-log parser produces `SourceRead`, the client state store
/// produces `Persistence`, and report assembly produces `ReportGeneration`.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The status log could not be read, or its content is structurally
    /// malformed (e.g. a byte counter that is not an integer).
    #[error("Status File Error: '{0}'")]
    SourceRead(String),

    /// The per-client state store could not be read or written.
    #[error("Client State Error: '{0}'")]
    Persistence(String),

    /// The stored records could not be enumerated or turned into the report.
    #[error("Report Generation Error: '{0}'")]
    ReportGeneration(String),
}
