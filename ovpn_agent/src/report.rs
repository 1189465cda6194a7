//! Report builder.
//!
//! Walks every client known to the store, connected in the current poll or
//! not, and derives the externally reported metrics from its `latest`
//! snapshot.
//!
//! Note the reporting lag inherited from the consumer contract: counters come
//! from `latest` alone, so the running total for a client's open session does
//! not include the closed-session carry held in `accumulated` until the next
//! reconnect folds it. Downstream consumers expect this exact shape; do not
//! "fix" it here.

use chrono::NaiveDateTime;
use log::debug;
use ovpn_common::envelope::{ClientMetrics, InterfaceReport};
use ovpn_common::{CollectorError, Result};

use crate::store::ClientStore;

/// Timestamp layout of the status log's `Connected Since` column.
const SINCE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Derives per-client metrics from every stored record.
///
/// `now` is injected so the handshake age is computable in tests; callers
/// pass `Local::now().naive_local()`. Any store or timestamp failure is a
/// `ReportGeneration` error.
pub fn build_report(store: &ClientStore, now: NaiveDateTime) -> Result<InterfaceReport> {
    let names = store
        .list_all()
        .map_err(|e| CollectorError::ReportGeneration(e.to_string()))?;
    debug!("Reporting on {} known client(s)", names.len());

    let mut report = InterfaceReport::new();
    for name in names {
        let record = store
            .load(&name)
            .map_err(|e| CollectorError::ReportGeneration(e.to_string()))?
            .ok_or_else(|| {
                CollectorError::ReportGeneration(format!("record for '{name}' vanished"))
            })?;

        report.insert(
            record.latest.common_name.clone(),
            ClientMetrics {
                minutes_since_last_handshake: minutes_since_handshake(
                    &record.latest.connected_since,
                    now,
                )?,
                bytes_rcvd: record.latest.bytes_received,
                bytes_sent: record.latest.bytes_sent,
            },
        );
    }

    Ok(report)
}

/// Whole minutes between `since` and `now`, or `None` for an empty timestamp.
fn minutes_since_handshake(since: &str, now: NaiveDateTime) -> Result<Option<i64>> {
    if since.is_empty() {
        return Ok(None);
    }
    let handshake = NaiveDateTime::parse_from_str(since, SINCE_FORMAT).map_err(|e| {
        CollectorError::ReportGeneration(format!("invalid timestamp '{since}': {e}"))
    })?;
    Ok(Some((now - handshake).num_seconds() / 60))
}
