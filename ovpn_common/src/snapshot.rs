//! Per-client snapshot model and the counter accumulation rule.
//!
//! The OpenVPN status log reports byte counters relative to the *current*
//! session only: they reset to zero whenever a client reconnects. To produce
//! lifetime totals from periodic stateless polls, every client carries a pair
//! of snapshots:
//!
//! - `accumulated` — lifetime totals summed across all *closed* sessions,
//!   with the most recently closed session's start time.
//! - `latest` — the raw snapshot from the most recent poll, not yet folded
//!   into `accumulated`.
//!
//! The session start timestamp is the reconnect detector: as long as two
//! consecutive observations share `connected_since`, the newer counters
//! supersede the older ones (same session, already cumulative). When the
//! timestamp changes, the previous session has closed and its final counters
//! (held in `latest`) are folded into `accumulated` exactly once.
//!
//! Values are serialized with `bincode` for compact durable storage.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One poll's observation of a single connected client.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stable per-client identifier; the primary key for all stored state.
    pub common_name: String,
    /// Peer IP as reported by the server, port stripped.
    pub real_address: String,
    /// Tunnel-assigned address, absent when the status log carries no
    /// routing-table entry for the client at this instant.
    pub virtual_address: Option<String>,
    /// Bytes received since the current session began.
    pub bytes_received: u64,
    /// Bytes sent since the current session began.
    pub bytes_sent: u64,
    /// The session's start time, verbatim from the status log
    /// (e.g. `Thu Jun 18 04:23:03 2026`). Empty when the server reported none.
    pub connected_since: String,
}

/// Durable per-client state: the accumulated totals plus the latest raw
/// observation. Exactly one record exists per common name.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Lifetime counters summed over all closed sessions.
    pub accumulated: Snapshot,
    /// Most recent raw observation, not yet folded in.
    pub latest: Snapshot,
}

impl ClientRecord {
    /// Creates the record for a client seen for the first time. Counters
    /// start at their reported values; no accumulation is needed yet.
    pub fn first_observation(snapshot: Snapshot) -> Self {
        ClientRecord {
            accumulated: snapshot.clone(),
            latest: snapshot,
        }
    }

    /// Applies one new observation to the record.
    ///
    /// Same session (equal `connected_since`): the server's counters are
    /// already cumulative for this session, so the new snapshot simply
    /// replaces `latest` and `accumulated` is untouched.
    ///
    /// Different session (reconnect): `latest` holds the final counters of a
    /// session that has now closed; they are added to `accumulated` once,
    /// together with the closed session's start time and real address, and
    /// the new snapshot becomes `latest`.
    ///
    /// `accumulated.bytes_received`/`bytes_sent` are therefore non-decreasing
    /// over any sequence of calls.
    pub fn absorb(&mut self, snapshot: Snapshot) {
        if self.latest.connected_since != snapshot.connected_since {
            self.accumulated.bytes_received += self.latest.bytes_received;
            self.accumulated.bytes_sent += self.latest.bytes_sent;
            self.accumulated.connected_since = self.latest.connected_since.clone();
            self.accumulated.real_address = self.latest.real_address.clone();
        }
        self.latest = snapshot;
    }
}
