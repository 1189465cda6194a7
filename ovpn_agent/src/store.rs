//! Durable per-client state store.
//!
//! One `bincode`-encoded file per client under the db directory, named
//! `<common_name>.log`. A save writes to a temporary file in the same
//! directory and renames it over the final path, so a subsequent read never
//! observes a partially written record. Records are never deleted here:
//! removing a retired client is an administrative action on the directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ovpn_common::{ClientRecord, CollectorError, Result};

/// Suffix of every record file in the db directory.
const RECORD_EXT: &str = "log";

/// Key-value store mapping a client's common name to its [`ClientRecord`].
pub struct ClientStore {
    dir: PathBuf,
}

impl ClientStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| CollectorError::Persistence(format!("{}: {e}", dir.display())))?;
        Ok(ClientStore {
            dir: dir.to_path_buf(),
        })
    }

    /// Loads the record for `common_name`, or `None` if the client has never
    /// been observed.
    pub fn load(&self, common_name: &str) -> Result<Option<ClientRecord>> {
        let path = self.record_path(common_name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CollectorError::Persistence(format!(
                    "{}: {e}",
                    path.display()
                )));
            }
        };
        let (record, _) = bincode::decode_from_slice(&bytes, bincode::config::standard())
            .map_err(|e| CollectorError::Persistence(format!("{}: {e}", path.display())))?;
        Ok(Some(record))
    }

    /// Overwrites the record for `common_name`. The record is fully durable
    /// before this returns.
    pub fn save(&self, common_name: &str, record: &ClientRecord) -> Result<()> {
        let path = self.record_path(common_name)?;
        let bytes = bincode::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| CollectorError::Persistence(e.to_string()))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)
            .map_err(|e| CollectorError::Persistence(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| CollectorError::Persistence(format!("{}: {e}", path.display())))?;
        debug!("Saved record for '{}' ({} bytes)", common_name, bytes.len());
        Ok(())
    }

    /// Lists the common name of every stored client, connected or not.
    pub fn list_all(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| CollectorError::Persistence(format!("{}: {e}", self.dir.display())))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| CollectorError::Persistence(format!("{}: {e}", self.dir.display())))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Maps a common name to its record path, rejecting names that would
    /// escape the db directory.
    fn record_path(&self, common_name: &str) -> Result<PathBuf> {
        if common_name.is_empty()
            || common_name.contains(['/', '\\'])
            || common_name == "."
            || common_name == ".."
        {
            return Err(CollectorError::Persistence(format!(
                "invalid common name: '{common_name}'"
            )));
        }
        Ok(self.dir.join(format!("{common_name}.{RECORD_EXT}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovpn_common::Snapshot;

    fn temp_store(name: &str) -> ClientStore {
        let dir = std::env::temp_dir().join(format!("ovpn_store_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        ClientStore::open(&dir).unwrap()
    }

    fn record(recv: u64, sent: u64, since: &str) -> ClientRecord {
        ClientRecord::first_observation(Snapshot {
            common_name: "laptop".to_string(),
            real_address: "203.0.113.7".to_string(),
            virtual_address: None,
            bytes_received: recv,
            bytes_sent: sent,
            connected_since: since.to_string(),
        })
    }

    #[test]
    fn load_of_unknown_client_is_none() {
        let store = temp_store("unknown");
        assert_eq!(store.load("laptop").unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("round_trip");
        let saved = record(100, 50, "Thu Jun 18 04:23:03 2026");
        store.save("laptop", &saved).unwrap();
        assert_eq!(store.load("laptop").unwrap(), Some(saved));
    }

    #[test]
    fn save_overwrites_previous_record() {
        let store = temp_store("overwrite");
        store.save("laptop", &record(1, 1, "a")).unwrap();
        let newer = record(2, 2, "b");
        store.save("laptop", &newer).unwrap();
        assert_eq!(store.load("laptop").unwrap(), Some(newer));
    }

    #[test]
    fn list_all_enumerates_every_stored_client() {
        let store = temp_store("list_all");
        store.save("laptop", &record(1, 1, "a")).unwrap();
        store.save("phone", &record(2, 2, "b")).unwrap();
        assert_eq!(store.list_all().unwrap(), vec!["laptop", "phone"]);
    }

    #[test]
    fn path_escaping_common_name_is_rejected() {
        let store = temp_store("escape");
        let err = store.save("../evil", &record(1, 1, "a")).unwrap_err();
        assert!(matches!(err, CollectorError::Persistence(_)));
        assert!(matches!(
            store.load("").unwrap_err(),
            CollectorError::Persistence(_)
        ));
    }

    #[test]
    fn corrupt_record_is_a_persistence_error() {
        let store = temp_store("corrupt");
        store.save("laptop", &record(1, 1, "a")).unwrap();
        fs::write(store.record_path("laptop").unwrap(), b"\xff\xfe").unwrap();
        assert!(matches!(
            store.load("laptop").unwrap_err(),
            CollectorError::Persistence(_)
        ));
    }
}
