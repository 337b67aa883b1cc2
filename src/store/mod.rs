//! Persisted record collections.
//!
//! Every entity type lives under its own namespace key as a JSON value: an
//! ordered array for collections, a single object for settings-like records.
//! Writes are staged in a [`WriteBatch`] and applied by [`RecordStore::commit`],
//! which either applies the whole batch or leaves the previous state in place.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{BillingError, Result};

pub const INVOICES: &str = "invoices";
pub const BILLING_HISTORY: &str = "billing_history";
pub const AUDIT: &str = "audit";
pub const PATIENTS: &str = "patients";
pub const LAB_ORDERS: &str = "lab_orders";
pub const PRESCRIPTIONS: &str = "prescriptions";
pub const COUNTERS: &str = "counters";

pub trait RecordStore {
    /// Current value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Apply every write in `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<()>;
}

/// Pending writes keyed by namespace. A later write to the same key replaces
/// the earlier one.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: BTreeMap<String, Value>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        self.writes
            .insert(key.to_string(), serde_json::to_value(items)?);
        Ok(())
    }

    pub fn put_object<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.writes
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Staged list for `key`, falling back to the store's current value.
    pub fn list_or_load<T, S>(&self, store: &S, key: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        S: RecordStore + ?Sized,
    {
        match self.writes.get(key) {
            Some(value) => decode(key, value.clone()),
            None => get_list(store, key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn into_writes(self) -> impl Iterator<Item = (String, Value)> {
        self.writes.into_iter()
    }
}

/// Read a collection. A missing key is an empty collection.
pub fn get_list<T, S>(store: &S, key: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    match store.load(key)? {
        Some(value) => decode(key, value),
        None => Ok(Vec::new()),
    }
}

/// Read a single object, or `fallback` when nothing is stored yet.
pub fn get_object<T, S>(store: &S, key: &str, fallback: T) -> Result<T>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    match store.load(key)? {
        Some(value) => decode(key, value),
        None => Ok(fallback),
    }
}

/// Replace a whole collection in its own commit.
pub fn set_list<T, S>(store: &mut S, key: &str, items: &[T]) -> Result<()>
where
    T: Serialize,
    S: RecordStore + ?Sized,
{
    let mut batch = WriteBatch::new();
    batch.put_list(key, items)?;
    store.commit(batch)
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| BillingError::CorruptRecords {
        key: key.to_string(),
        source: e,
    })
}

/// Serialized size of a whole document, checked against an optional quota.
fn check_quota(document: &BTreeMap<String, Value>, quota: Option<u64>) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec(document)?;
    if let Some(quota) = quota {
        let needed = bytes.len() as u64;
        if needed > quota {
            return Err(BillingError::StorageFull { needed, quota });
        }
    }
    Ok(bytes)
}
