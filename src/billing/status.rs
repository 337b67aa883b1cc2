use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Partial,
    Unpaid,
    Overpaid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Overpaid => "overpaid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Status of an invoice given its total and what has been paid against it.
///
/// The checks run in a fixed order: nothing paid is `Unpaid` even when the
/// total is zero, and paying more than the total is `Overpaid` before it is
/// considered `Paid`.
pub fn recalc_status(total: Decimal, paid: Decimal) -> InvoiceStatus {
    if paid.is_zero() {
        InvoiceStatus::Unpaid
    } else if paid > total {
        InvoiceStatus::Overpaid
    } else if paid >= total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    }
}
