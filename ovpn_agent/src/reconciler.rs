//! Reconciliation pass over one poll's snapshots.
//!
//! Runs single-threaded to completion; the external scheduler (snmpd calling
//! the agent at a fixed interval) is assumed to serialize invocations, so no
//! per-record locking guards the load→save sequence. Each client's update is
//! committed by its own save: an error mid-pass leaves already-processed
//! clients updated and the rest untouched until the next poll.

use log::{debug, info};
use ovpn_common::{ClientRecord, Result, Snapshot};

use crate::store::ClientStore;

/// Merges every current snapshot into its client's stored record, creating
/// records for clients observed for the first time.
pub fn reconcile_all(store: &ClientStore, snapshots: Vec<Snapshot>) -> Result<()> {
    info!("Reconciling {} connected client(s)", snapshots.len());

    for snapshot in snapshots {
        let common_name = snapshot.common_name.clone();
        let record = match store.load(&common_name)? {
            Some(mut record) => {
                record.absorb(snapshot);
                record
            }
            None => {
                debug!("First observation of client '{}'", common_name);
                ClientRecord::first_observation(snapshot)
            }
        };
        store.save(&common_name, &record)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store(name: &str) -> ClientStore {
        let dir =
            std::env::temp_dir().join(format!("ovpn_reconcile_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        ClientStore::open(&dir).unwrap()
    }

    fn snapshot(cn: &str, recv: u64, sent: u64, since: &str) -> Snapshot {
        Snapshot {
            common_name: cn.to_string(),
            real_address: "203.0.113.7".to_string(),
            virtual_address: None,
            bytes_received: recv,
            bytes_sent: sent,
            connected_since: since.to_string(),
        }
    }

    #[test]
    fn first_poll_creates_records() {
        let store = temp_store("first_poll");
        let s = snapshot("laptop", 10, 5, "Thu Jun 18 04:23:03 2026");
        reconcile_all(&store, vec![s.clone()]).unwrap();

        let record = store.load("laptop").unwrap().unwrap();
        assert_eq!(record.accumulated, s);
        assert_eq!(record.latest, s);
    }

    #[test]
    fn repeated_polls_of_one_session_keep_accumulated_stable() {
        let store = temp_store("same_session");
        let since = "Thu Jun 18 04:23:03 2026";
        reconcile_all(&store, vec![snapshot("laptop", 10, 5, since)]).unwrap();
        reconcile_all(&store, vec![snapshot("laptop", 100, 50, since)]).unwrap();
        reconcile_all(&store, vec![snapshot("laptop", 200, 90, since)]).unwrap();

        let record = store.load("laptop").unwrap().unwrap();
        assert_eq!(record.accumulated.bytes_received, 10);
        assert_eq!(record.accumulated.bytes_sent, 5);
        assert_eq!(record.latest.bytes_received, 200);
        assert_eq!(record.latest.bytes_sent, 90);
    }

    #[test]
    fn reconnect_folds_closed_session_across_polls() {
        let store = temp_store("reconnect");
        reconcile_all(&store, vec![snapshot("laptop", 30, 10, "T0")]).unwrap();
        reconcile_all(&store, vec![snapshot("laptop", 5, 2, "T1")]).unwrap();

        let record = store.load("laptop").unwrap().unwrap();
        assert_eq!(record.accumulated.bytes_received, 60);
        assert_eq!(record.accumulated.bytes_sent, 20);
        assert_eq!(record.accumulated.connected_since, "T0");
        assert_eq!(record.latest, snapshot("laptop", 5, 2, "T1"));
    }

    #[test]
    fn absent_client_keeps_its_stored_record() {
        let store = temp_store("absent");
        reconcile_all(&store, vec![snapshot("laptop", 30, 10, "T0")]).unwrap();
        reconcile_all(&store, vec![snapshot("phone", 1, 1, "T1")]).unwrap();

        let record = store.load("laptop").unwrap().unwrap();
        assert_eq!(record.latest.bytes_received, 30);
        assert_eq!(store.list_all().unwrap(), vec!["laptop", "phone"]);
    }
}
