use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::audit::{self, MODULE_BILLING};
use super::billable::billable_items_for;
use super::history::{self, BillingHistoryEntry};
use super::model::{items_total, Invoice, InvoiceItem, NewInvoice, NewPayment, Payment, PaymentUpdate};
use super::money::format_money;
use crate::error::{BillingError, Result};
use crate::store::{get_list, get_object, RecordStore, WriteBatch, COUNTERS, INVOICES};

/// Last issued sequence numbers, persisted under [`COUNTERS`].
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub struct Counters {
    #[serde(default)]
    pub invoice: u32,
}

/// Display number for an invoice sequence
pub fn format_invoice_no(seq: u32) -> String {
    format!("INV-{:04}", seq)
}

/// Invoice and payment ledger over a record store.
///
/// Each mutating call reads the current invoice collection, applies one change,
/// and commits the invoice write, the billing history entry and the audit
/// entry as a single batch.
pub struct Ledger<'a, S: RecordStore + ?Sized> {
    store: &'a mut S,
    user: String,
    currency: String,
}

impl<'a, S: RecordStore + ?Sized> Ledger<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            user: "Admin".to_string(),
            currency: "KES".to_string(),
        }
    }

    /// Name recorded on history and audit entries.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Currency prefix used in history and audit details.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn store(&self) -> &S {
        &*self.store
    }

    /// All invoices in creation order.
    pub fn invoices(&self) -> Result<Vec<Invoice>> {
        get_list(&*self.store, INVOICES)
    }

    pub fn invoice(&self, invoice_id: &str) -> Result<Invoice> {
        self.invoices()?
            .into_iter()
            .find(|inv| inv.id == invoice_id)
            .ok_or_else(|| BillingError::InvoiceNotFound(invoice_id.to_string()))
    }

    /// Look an invoice up by id or by invoice number (case-insensitive).
    pub fn find_invoice(&self, reference: &str) -> Result<Invoice> {
        self.invoices()?
            .into_iter()
            .find(|inv| inv.id == reference || inv.invoice_no.eq_ignore_ascii_case(reference))
            .ok_or_else(|| BillingError::InvoiceNotFound(reference.to_string()))
    }

    /// Billing history, newest first.
    pub fn history(&self, invoice_id: Option<&str>) -> Result<Vec<BillingHistoryEntry>> {
        history::query(&*self.store, invoice_id)
    }

    pub fn billable_items(&self, patient_id: &str) -> Result<Vec<InvoiceItem>> {
        billable_items_for(&*self.store, patient_id)
    }

    /// Number the next invoice would get.
    pub fn next_invoice_no(&self) -> Result<String> {
        let invoices = self.invoices()?;
        let counters: Counters = get_object(&*self.store, COUNTERS, Counters::default())?;
        Ok(format_invoice_no(next_sequence(&invoices, counters)))
    }

    pub fn create_invoice(&mut self, new: NewInvoice) -> Result<Invoice> {
        let mut invoices = self.invoices()?;
        let mut counters: Counters = get_object(&*self.store, COUNTERS, Counters::default())?;

        let seq = next_sequence(&invoices, counters);
        counters.invoice = seq;

        let total = items_total(&new.items);
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_no: format_invoice_no(seq),
            patient_id: new.patient_id,
            patient_name: new.patient_name,
            items: new.items,
            total,
            paid: Decimal::ZERO,
            status: new.status,
            payments: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        invoices.push(invoice.clone());

        let mut batch = WriteBatch::new();
        batch.put_list(INVOICES, &invoices)?;
        batch.put_object(COUNTERS, &counters)?;
        let amount = self.money(total);
        self.log(
            &mut batch,
            &invoice,
            history::CREATED,
            &format!("Invoice created for {amount}"),
            "Created",
            &format!("Invoice {} - {amount}", invoice.invoice_no),
        )?;
        self.store.commit(batch)?;

        info!(invoice_no = %invoice.invoice_no, patient = %invoice.patient_id, %total, "invoice created");
        Ok(invoice)
    }

    /// Replace the line items of an invoice and recompute its total. Payments
    /// and status are left alone.
    pub fn update_invoice_items(&mut self, invoice_id: &str, items: Vec<InvoiceItem>) -> Result<Invoice> {
        let (mut invoices, idx) = self.load_for_update(invoice_id)?;

        let invoice = &mut invoices[idx];
        invoice.total = items_total(&items);
        invoice.items = items;
        invoice.updated_at = Some(Utc::now());
        let invoice = invoice.clone();

        let mut batch = WriteBatch::new();
        batch.put_list(INVOICES, &invoices)?;
        self.log(
            &mut batch,
            &invoice,
            history::UPDATED,
            &format!("Invoice line items updated. Total: {}", self.money(invoice.total)),
            "Updated",
            &format!("Invoice {} updated", invoice.invoice_no),
        )?;
        self.store.commit(batch)?;

        info!(invoice_no = %invoice.invoice_no, total = %invoice.total, "invoice items updated");
        Ok(invoice)
    }

    pub fn add_payment(&mut self, invoice_id: &str, new: NewPayment) -> Result<Payment> {
        if new.amount <= Decimal::ZERO {
            return Err(BillingError::InvalidPaymentAmount);
        }
        let (mut invoices, idx) = self.load_for_update(invoice_id)?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            amount: new.amount,
            mode: new.mode,
            reference: new.reference,
            notes: new.notes,
            paid_at: Utc::now(),
        };
        let invoice = &mut invoices[idx];
        invoice.payments.push(payment.clone());
        invoice.settle();
        invoice.updated_at = Some(Utc::now());
        let invoice = invoice.clone();

        let details = format!("Payment of {} via {}", self.money(payment.amount), payment.mode);
        let mut batch = WriteBatch::new();
        batch.put_list(INVOICES, &invoices)?;
        self.log(&mut batch, &invoice, history::PAYMENT, &details, "Payment", &details)?;
        self.store.commit(batch)?;

        info!(
            invoice_no = %invoice.invoice_no,
            amount = %payment.amount,
            mode = %payment.mode,
            status = invoice.status.as_str(),
            "payment recorded"
        );
        Ok(payment)
    }

    /// Patch a payment in place. `id` and `paid_at` never change.
    pub fn update_payment(
        &mut self,
        invoice_id: &str,
        payment_id: &str,
        update: PaymentUpdate,
    ) -> Result<Payment> {
        if update.amount.is_some_and(|a| a < Decimal::ZERO) {
            return Err(BillingError::NegativePaymentAmount);
        }
        let (mut invoices, idx) = self.load_for_update(invoice_id)?;

        let invoice = &mut invoices[idx];
        let pos = payment_index(invoice, payment_id)?;
        update.apply(&mut invoice.payments[pos]);
        invoice.settle();
        invoice.updated_at = Some(Utc::now());
        let payment = invoice.payments[pos].clone();
        let invoice = invoice.clone();

        let mut batch = WriteBatch::new();
        batch.put_list(INVOICES, &invoices)?;
        self.log(
            &mut batch,
            &invoice,
            history::PAYMENT_EDITED,
            &format!("Payment {} edited", payment.id),
            "Updated",
            &format!("Payment edited on {}", invoice.invoice_no),
        )?;
        self.store.commit(batch)?;

        info!(
            invoice_no = %invoice.invoice_no,
            payment = %payment.id,
            status = invoice.status.as_str(),
            "payment edited"
        );
        Ok(payment)
    }

    pub fn delete_payment(&mut self, invoice_id: &str, payment_id: &str) -> Result<Payment> {
        let (mut invoices, idx) = self.load_for_update(invoice_id)?;

        let invoice = &mut invoices[idx];
        let pos = payment_index(invoice, payment_id)?;
        let removed = invoice.payments.remove(pos);
        invoice.settle();
        invoice.updated_at = Some(Utc::now());
        let invoice = invoice.clone();

        let mut batch = WriteBatch::new();
        batch.put_list(INVOICES, &invoices)?;
        self.log(
            &mut batch,
            &invoice,
            history::PAYMENT_DELETED,
            "Payment removed",
            "Deleted",
            &format!("Payment deleted on {}", invoice.invoice_no),
        )?;
        self.store.commit(batch)?;

        info!(
            invoice_no = %invoice.invoice_no,
            payment = %removed.id,
            status = invoice.status.as_str(),
            "payment deleted"
        );
        Ok(removed)
    }

    /// Fresh copy of the invoice collection plus the position of `invoice_id`.
    fn load_for_update(&self, invoice_id: &str) -> Result<(Vec<Invoice>, usize)> {
        let invoices = self.invoices()?;
        debug!(invoice_id, count = invoices.len(), "loaded invoices for update");
        let idx = invoices
            .iter()
            .position(|inv| inv.id == invoice_id)
            .ok_or_else(|| BillingError::InvoiceNotFound(invoice_id.to_string()))?;
        Ok((invoices, idx))
    }

    /// Stage one billing history entry and one audit entry for `invoice`.
    fn log(
        &self,
        batch: &mut WriteBatch,
        invoice: &Invoice,
        history_action: &str,
        history_details: &str,
        audit_action: &str,
        audit_details: &str,
    ) -> Result<()> {
        history::append(
            &*self.store,
            batch,
            &invoice.id,
            &invoice.invoice_no,
            history_action,
            history_details,
            &self.user,
        )?;
        audit::append(
            &*self.store,
            batch,
            audit_action,
            MODULE_BILLING,
            audit_details,
            &self.user,
        )
    }

    fn money(&self, amount: Decimal) -> String {
        format_money(amount, &self.currency)
    }
}

fn payment_index(invoice: &Invoice, payment_id: &str) -> Result<usize> {
    invoice
        .payments
        .iter()
        .position(|p| p.id == payment_id)
        .ok_or_else(|| BillingError::PaymentNotFound {
            invoice: invoice.invoice_no.clone(),
            payment: payment_id.to_string(),
        })
}

/// Next free sequence: past both the counter and the collection length, and
/// not already used by an existing invoice number.
fn next_sequence(invoices: &[Invoice], counters: Counters) -> u32 {
    let mut seq = counters.invoice.max(invoices.len() as u32) + 1;
    while invoices
        .iter()
        .any(|inv| inv.invoice_no == format_invoice_no(seq))
    {
        seq += 1;
    }
    seq
}
