use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{check_quota, RecordStore, WriteBatch};
use crate::error::{BillingError, Result};

/// Record store backed by a single JSON document on disk.
///
/// Every `load` reads the file again, so a ledger operation always starts from
/// what is persisted rather than from a stale copy. `commit` writes the new
/// document to a sibling temp file and renames it over the original, so a
/// reader sees either the old document or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
        }
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| BillingError::CorruptRecords {
            key: self.path.display().to_string(),
            source: e,
        })
    }
}

impl RecordStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        debug!(key, path = %self.path.display(), "load");
        Ok(document.remove(key))
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        let mut document = self.read_document()?;
        let keys = batch.len();
        for (key, value) in batch.into_writes() {
            document.insert(key, value);
        }
        let bytes = check_quota(&document, self.quota_bytes)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        replace_file(&self.path, &bytes)?;

        debug!(keys, bytes = bytes.len(), path = %self.path.display(), "commit");
        Ok(())
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`. On failure
/// the temp file is removed and `path` is left as it was.
fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let result = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
