//! Per-invoice change log shown under each invoice.
//!
//! Entries are kept newest first and are never edited, removed or capped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{get_list, RecordStore, WriteBatch, BILLING_HISTORY};

pub const CREATED: &str = "Created";
pub const UPDATED: &str = "Updated";
pub const PAYMENT: &str = "Payment";
pub const PAYMENT_EDITED: &str = "Payment Edited";
pub const PAYMENT_DELETED: &str = "Payment Deleted";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BillingHistoryEntry {
    pub id: String,
    pub invoice_id: String,
    pub invoice_no: String,
    pub action: String,
    pub details: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

/// Stage a history entry at the front of the log.
pub fn append<S: RecordStore + ?Sized>(
    store: &S,
    batch: &mut WriteBatch,
    invoice_id: &str,
    invoice_no: &str,
    action: &str,
    details: &str,
    user: &str,
) -> Result<()> {
    let mut entries: Vec<BillingHistoryEntry> = batch.list_or_load(store, BILLING_HISTORY)?;
    entries.insert(
        0,
        BillingHistoryEntry {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            invoice_no: invoice_no.to_string(),
            action: action.to_string(),
            details: details.to_string(),
            user: user.to_string(),
            timestamp: Utc::now(),
        },
    );
    batch.put_list(BILLING_HISTORY, &entries)
}

/// All entries, newest first, optionally only those for one invoice.
pub fn query<S: RecordStore + ?Sized>(
    store: &S,
    invoice_id: Option<&str>,
) -> Result<Vec<BillingHistoryEntry>> {
    let all: Vec<BillingHistoryEntry> = get_list(store, BILLING_HISTORY)?;
    Ok(match invoice_id {
        Some(id) => all.into_iter().filter(|h| h.invoice_id == id).collect(),
        None => all,
    })
}
