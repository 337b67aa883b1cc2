use serde_json::Value;
use std::collections::BTreeMap;

use super::{check_quota, RecordStore, WriteBatch};
use crate::error::Result;

/// Record store held in memory, with the same quota behavior as [`super::FileStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    document: BTreeMap<String, Value>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            document: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Serialized size of everything stored.
    pub fn size_bytes(&self) -> usize {
        serde_json::to_vec(&self.document).map_or(0, |b| b.len())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.document.get(key).cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        let mut next = self.document.clone();
        for (key, value) in batch.into_writes() {
            next.insert(key, value);
        }
        check_quota(&next, self.quota_bytes)?;
        self.document = next;
        Ok(())
    }
}
