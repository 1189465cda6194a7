//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `CollectorError`, so functions can simply return `Result<T>`.
use crate::error::CollectorError;

/// Workspace-wide `Result` alias with `CollectorError` as the default error.
pub type Result<T, E = CollectorError> = std::result::Result<T, E>;
