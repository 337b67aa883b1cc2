//! System-wide audit log. Billing only appends to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{get_list, RecordStore, WriteBatch, AUDIT};

/// Only this many of the most recent entries are kept.
pub const AUDIT_LIMIT: usize = 500;

pub const MODULE_BILLING: &str = "Billing";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub action: String,
    pub module: String,
    pub details: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

/// Stage an entry at the front of the audit log, dropping the oldest beyond
/// [`AUDIT_LIMIT`].
pub fn append<S: RecordStore + ?Sized>(
    store: &S,
    batch: &mut WriteBatch,
    action: &str,
    module: &str,
    details: &str,
    user: &str,
) -> Result<()> {
    let mut entries: Vec<AuditEntry> = batch.list_or_load(store, AUDIT)?;
    entries.insert(
        0,
        AuditEntry {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            module: module.to_string(),
            details: details.to_string(),
            user: user.to_string(),
            timestamp: Utc::now(),
        },
    );
    entries.truncate(AUDIT_LIMIT);
    batch.put_list(AUDIT, &entries)
}

/// Newest first.
pub fn entries<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<AuditEntry>> {
    get_list(store, AUDIT)
}
