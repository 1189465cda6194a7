//! Status-log parser.
//!
//! An OpenVPN status log mixes several comma-separated record shapes in one
//! file; this parser dispatches on field count and recognizes two of them:
//!
//! - 5 fields — a client record: common name, `real_address:port`, bytes
//!   received, bytes sent, session start time.
//! - 4 fields — a routing-table record: virtual address, common name, plus
//!   two fields this agent does not use.
//!
//! Header lines repeat the column titles in the first field and are skipped.
//! Every other line shape (title, timestamps, `ROUTING TABLE`, `END`, ...) is
//! ignored. The log lists client records before the routing records that
//! reference them, so a routing record can always be matched against an
//! already-parsed snapshot; an unmatched one is dropped.

use std::io::BufRead;

use ovpn_common::{CollectorError, Result, Snapshot};

/// First field of the client-record header line.
const CLIENT_HEADER: &str = "Common Name";
/// First field of the routing-record header line.
const ROUTING_HEADER: &str = "Virtual Address";

/// Parses one status log into a snapshot per currently connected client.
///
/// Pure transformation; any read failure or malformed byte counter is a
/// `SourceRead` error.
pub fn parse_status<R: BufRead>(reader: R) -> Result<Vec<Snapshot>> {
    let mut hosts: Vec<Snapshot> = Vec::new();

    for line_result in reader.lines() {
        let line = line_result.map_err(|e| CollectorError::SourceRead(e.to_string()))?;
        let cols: Vec<&str> = line.split(',').collect();

        match cols.len() {
            5 if !line.starts_with(CLIENT_HEADER) => {
                hosts.push(Snapshot {
                    common_name: cols[0].to_string(),
                    real_address: strip_port(cols[1]),
                    virtual_address: None,
                    bytes_received: parse_counter(cols[2])?,
                    bytes_sent: parse_counter(cols[3])?,
                    connected_since: cols[4].trim().to_string(),
                });
            }
            4 if !line.starts_with(ROUTING_HEADER) => {
                if let Some(host) = hosts.iter_mut().find(|h| h.common_name == cols[1]) {
                    host.virtual_address = Some(cols[0].to_string());
                }
            }
            _ => {}
        }
    }

    Ok(hosts)
}

/// Drops the `:port` suffix from a `real_address:port` field.
fn strip_port(real: &str) -> String {
    real.split(':').next().unwrap_or_default().to_string()
}

fn parse_counter(field: &str) -> Result<u64> {
    field
        .trim()
        .parse()
        .map_err(|_| CollectorError::SourceRead(format!("invalid byte counter: '{field}'")))
}
