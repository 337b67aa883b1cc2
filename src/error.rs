use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'clinic init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Select a patient with --patient <id>")]
    NoPatient,

    #[error("Patient '{0}' not found")]
    PatientNotFound(String),

    #[error("No items specified. Use --item <description>:<amount> to add line items.")]
    NoItems,

    #[error("Invalid item format '{0}'. Expected 'description:amount' (e.g., 'Consultation:1500')")]
    InvalidItemFormat(String),

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'clinic list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Payment '{payment}' not found on {invoice}")]
    PaymentNotFound { invoice: String, payment: String },

    #[error("Nothing to change. Pass at least one of --amount, --mode, --reference or --notes.")]
    NoPaymentChanges,

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Payment amount cannot be negative")]
    NegativePaymentAmount,

    #[error("Payment mode is required. Use --mode <mode> (see 'clinic modes').")]
    NoPaymentMode,

    #[error("Unknown payment mode '{0}'. Use 'clinic modes' to see configured modes.")]
    UnknownPaymentMode(String),

    #[error("Storage full: writing {needed} bytes would exceed the {quota} byte quota")]
    StorageFull { needed: u64, quota: u64 },

    #[error("Stored collection '{key}' is corrupt: {source}")]
    CorruptRecords {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid period '{0}'. Use today, week, month, quarter, year, all or custom.")]
    InvalidPeriod(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Custom period requires both --from and --to")]
    IncompleteCustomPeriod,

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
