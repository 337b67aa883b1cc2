pub mod audit;
mod billable;
pub mod history;
mod ledger;
mod model;
mod money;
mod status;

pub use billable::{billable_items_for, SOURCE_LAB, SOURCE_PRESCRIPTION};
pub use history::BillingHistoryEntry;
pub use ledger::{format_invoice_no, Counters, Ledger};
pub use model::{items_total, Invoice, InvoiceItem, NewInvoice, NewPayment, Payment, PaymentUpdate};
pub use money::{format_money, parse_amount};
pub use status::{recalc_status, InvoiceStatus};
