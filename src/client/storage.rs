//! File-backed string key-value store, the client's equivalent of browser local storage.

use crate::error::GeolensError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Storage living in `dir`; the directory is created on first write.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unreadable storage reads as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read local storage");
                return None;
            }
        };
        match all.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Fails without touching the file when the current contents cannot be read,
    /// so sibling keys are never lost.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), GeolensError> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), Value::String(value.into()));
        self.write_all(&all)
    }

    pub fn clear(&self) -> Result<(), GeolensError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// A missing or malformed file reads as empty storage; any other I/O error is returned.
    fn read_all(&self) -> Result<Map<String, Value>, GeolensError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                warn!(path = %self.path.display(), "local storage is malformed; treating as empty");
                Ok(Map::new())
            }
        }
    }

    /// Replace the whole file via write-to-temp + rename.
    fn write_all(&self, all: &Map<String, Value>) -> Result<(), GeolensError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(all)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
