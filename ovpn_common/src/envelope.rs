//! Output envelope for the monitoring host's SNMP extend protocol.
//!
//! The agent prints exactly one JSON document to stdout per invocation. The
//! monitoring host expects the same envelope its wireguard application
//! consumes:
//!
//! ```json
//! {"errorString": "", "error": 0, "version": 1, "data": {"tun0": {...}}}
//! ```
//!
//! On failure the error kind and message go into `errorString`, `error` is
//! set to 1, and no client data is emitted at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CollectorError;

/// Envelope protocol version expected by the consumer.
pub const VERSION: u8 = 1;

/// Externally reported metrics for one client.
///
/// Field names are part of the consumer contract and must stay exactly as
/// spelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetrics {
    /// Whole minutes elapsed since the client's last session start, or
    /// `None` when the server reported no timestamp.
    pub minutes_since_last_handshake: Option<i64>,
    /// Bytes received in the client's latest known session.
    pub bytes_rcvd: u64,
    /// Bytes sent in the client's latest known session.
    pub bytes_sent: u64,
}

/// Per-client metrics keyed by common name.
pub type InterfaceReport = BTreeMap<String, ClientMetrics>;

/// Top-level JSON document handed to the monitoring host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Human-readable description of the failure; empty on success.
    #[serde(rename = "errorString")]
    pub error_string: String,
    /// 0 on success, 1 on failure.
    pub error: u8,
    /// Protocol version marker, always [`VERSION`].
    pub version: u8,
    /// Client metrics grouped under the interface label. Empty on failure.
    pub data: BTreeMap<String, InterfaceReport>,
}

impl Envelope {
    /// Builds the success envelope with `report` nested under `interface`.
    pub fn success(interface: &str, report: InterfaceReport) -> Self {
        let mut data = BTreeMap::new();
        data.insert(interface.to_string(), report);
        Envelope {
            error_string: String::new(),
            error: 0,
            version: VERSION,
            data,
        }
    }

    /// Builds the failure envelope carrying the error message and no data.
    pub fn failure(err: &CollectorError) -> Self {
        Envelope {
            error_string: err.to_string(),
            error: 1,
            version: VERSION,
            data: BTreeMap::new(),
        }
    }

    /// Encodes the envelope as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
