use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{recalc_status, InvoiceStatus};

/// One billable charge on an invoice
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoiceItem {
    pub description: String,
    pub amount: Decimal,
    /// Where a suggested item came from (`lab` or `prescription`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
            source: None,
        }
    }
}

/// Sum of item amounts, in item order
pub fn items_total(items: &[InvoiceItem]) -> Decimal {
    items.iter().map(|i| i.amount).sum()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub amount: Decimal,
    pub mode: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub notes: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub invoice_no: String,
    pub patient_id: String,
    pub patient_name: String,
    pub items: Vec<InvoiceItem>,
    pub total: Decimal,
    pub paid: Decimal,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub payments: Vec<Payment>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// What is still owed; zero once paid or overpaid.
    pub fn balance_due(&self) -> Decimal {
        (self.total - self.paid).max(Decimal::ZERO)
    }

    /// Recompute `paid` from the payment list and derive `status` from it.
    pub(crate) fn settle(&mut self) {
        self.paid = self.payments.iter().map(|p| p.amount).sum();
        self.status = recalc_status(self.total, self.paid);
    }

    /// Position of a payment, by id, by 1-based position in the list, or by
    /// an id prefix of at least four characters that matches only one payment.
    pub fn payment_position(&self, reference: &str) -> Option<usize> {
        if let Some(pos) = self.payments.iter().position(|p| p.id == reference) {
            return Some(pos);
        }
        if let Ok(idx) = reference.parse::<usize>() {
            return (idx >= 1 && idx <= self.payments.len()).then(|| idx - 1);
        }
        if reference.len() < 4 {
            return None;
        }
        let mut matches = self
            .payments
            .iter()
            .enumerate()
            .filter(|(_, p)| p.id.starts_with(reference));
        match (matches.next(), matches.next()) {
            (Some((pos, _)), None) => Some(pos),
            _ => None,
        }
    }
}

/// Input for creating an invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub patient_id: String,
    pub patient_name: String,
    pub items: Vec<InvoiceItem>,
    pub status: InvoiceStatus,
}

impl NewInvoice {
    /// A new invoice in the `issued` state.
    pub fn issued(
        patient_id: impl Into<String>,
        patient_name: impl Into<String>,
        items: Vec<InvoiceItem>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            patient_name: patient_name.into(),
            items,
            status: InvoiceStatus::Issued,
        }
    }
}

/// Input for recording a payment
#[derive(Debug, Clone, Default)]
pub struct NewPayment {
    pub amount: Decimal,
    pub mode: String,
    pub reference: String,
    pub notes: String,
}

impl NewPayment {
    pub fn new(amount: Decimal, mode: impl Into<String>) -> Self {
        Self {
            amount,
            mode: mode.into(),
            ..Default::default()
        }
    }
}

/// Partial edit of a payment; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub amount: Option<Decimal>,
    pub mode: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl PaymentUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.mode.is_none() && self.reference.is_none() && self.notes.is_none()
    }

    pub(crate) fn apply(self, payment: &mut Payment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(mode) = self.mode {
            payment.mode = mode;
        }
        if let Some(reference) = self.reference {
            payment.reference = reference;
        }
        if let Some(notes) = self.notes {
            payment.notes = notes;
        }
    }
}
