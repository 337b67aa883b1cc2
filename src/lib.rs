pub mod billing;
pub mod config;
pub mod error;
pub mod input;
pub mod records;
pub mod report;
pub mod store;

pub use billing::{
    Invoice, InvoiceItem, InvoiceStatus, Ledger, NewInvoice, NewPayment, Payment, PaymentUpdate,
};
pub use config::{BillingSettings, Clinic, Config};
pub use error::{BillingError, Result};
pub use store::{FileStore, MemoryStore, RecordStore};
