use crate::client::storage::LocalStorage;
use crate::config::HISTORY_KEY;
use crate::error::GeolensError;
use crate::types::GeoRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One past lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ip: String,
    pub data: GeoRecord,
    /// Creation time in Unix milliseconds; doubles as the entry's identity.
    pub id: i64,
    #[serde(default)]
    pub checked: bool,
}

impl HistoryEntry {
    pub fn new(ip: impl Into<String>, data: GeoRecord) -> Self {
        Self {
            ip: ip.into(),
            data,
            id: Utc::now().timestamp_millis(),
            checked: false,
        }
    }
}

/// Most-recent-first list of lookups, written through to local storage on every change.
#[derive(Debug, Clone)]
pub struct History {
    storage: LocalStorage,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Load the persisted list; absent or malformed content yields an empty history.
    pub fn load(storage: LocalStorage) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored history is malformed; starting empty");
                Vec::new()
            }),
        };
        Self { storage, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn any_checked(&self) -> bool {
        self.entries.iter().any(|e| e.checked)
    }

    /// Put `entry` at the front.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), GeolensError> {
        self.entries.insert(0, entry);
        self.persist()
    }

    /// Drop every checked entry. Returns how many were removed.
    pub fn remove_checked(&mut self) -> Result<usize, GeolensError> {
        let before = self.entries.len();
        self.entries.retain(|e| !e.checked);
        self.persist()?;
        Ok(before - self.entries.len())
    }

    /// Flip the checked flag of the entry at `index`, returning the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, GeolensError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| GeolensError::validation(format!("No history entry #{index}")))?;
        entry.checked = !entry.checked;
        let now = entry.checked;
        self.persist()?;
        Ok(now)
    }

    /// The stored record at `index`, to make it the active one again.
    pub fn select(&self, index: usize) -> Option<&GeoRecord> {
        self.entries.get(index).map(|e| &e.data)
    }

    pub fn persist(&self) -> Result<(), GeolensError> {
        self.storage
            .set(HISTORY_KEY, serde_json::to_string(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(city: &str) -> GeoRecord {
        GeoRecord {
            city: Some(city.to_string()),
            loc: Some("1.0,2.0".to_string()),
            ..Default::default()
        }
    }

    fn entry(ip: &str, id: i64) -> HistoryEntry {
        HistoryEntry {
            ip: ip.to_string(),
            data: record(ip),
            id,
            checked: false,
        }
    }

    #[test]
    fn append_prepends() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = History::load(LocalStorage::in_dir(dir.path()));
        history.append(entry("1.1.1.1", 1)).unwrap();
        history.append(entry("2.2.2.2", 2)).unwrap();

        let ips: Vec<_> = history.entries().iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, ["2.2.2.2", "1.1.1.1"]);
    }

    #[test]
    fn remove_checked_keeps_unchecked() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        let mut history = History::load(storage.clone());
        history.append(entry("1.1.1.1", 1)).unwrap(); // A
        history.append(entry("2.2.2.2", 2)).unwrap(); // B -> [B, A]

        assert!(history.toggle(1).unwrap());
        assert!(history.any_checked());
        assert_eq!(history.remove_checked().unwrap(), 1);

        let ips: Vec<_> = history.entries().iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, ["2.2.2.2"]);
        assert!(!history.any_checked());
        assert_eq!(History::load(storage).entries(), history.entries());
    }

    #[test]
    fn toggle_twice_restores_and_bad_index_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = History::load(LocalStorage::in_dir(dir.path()));
        history.append(entry("1.1.1.1", 1)).unwrap();

        assert!(history.toggle(0).unwrap());
        assert!(!history.toggle(0).unwrap());
        assert!(matches!(history.toggle(5), Err(GeolensError::Validation(_))));
    }

    #[test]
    fn persist_then_load_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        let mut history = History::load(storage.clone());
        history.append(entry("1.1.1.1", 10)).unwrap();
        history.append(entry("8.8.8.8", 20)).unwrap();
        history.toggle(0).unwrap();

        let reloaded = History::load(storage);
        assert_eq!(reloaded.entries(), history.entries());
    }

    #[test]
    fn malformed_or_absent_history_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        assert!(History::load(storage.clone()).is_empty());

        storage.set(HISTORY_KEY, "[{\"ip\": 3}").unwrap();
        assert!(History::load(storage.clone()).is_empty());

        storage.set(HISTORY_KEY, "{\"not\":\"a list\"}").unwrap();
        assert!(History::load(storage).is_empty());
    }

    #[test]
    fn entries_without_checked_flag_load_unchecked() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        storage
            .set(HISTORY_KEY, r#"[{"ip":"8.8.8.8","data":{"city":"X"},"id":5}]"#)
            .unwrap();

        let history = History::load(storage);
        assert_eq!(history.entries().len(), 1);
        assert!(!history.entries()[0].checked);
        assert_eq!(history.select(0).and_then(|r| r.city.as_deref()), Some("X"));
        assert!(history.select(1).is_none());
    }
}
