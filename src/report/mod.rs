mod export;
mod period;

pub use export::write_invoices_csv;
pub use period::Period;

use rust_decimal::Decimal;

use crate::billing::Invoice;

/// Income by payment mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTotal {
    pub mode: String,
    pub amount: Decimal,
}

/// Totals over a set of invoices
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub invoices: usize,
    pub billed: Decimal,
    pub paid: Decimal,
    /// Never negative, even when the set is overpaid overall
    pub outstanding: Decimal,
    /// Modes in order of first appearance
    pub by_mode: Vec<ModeTotal>,
}

impl Summary {
    pub fn of(invoices: &[Invoice]) -> Self {
        let billed: Decimal = invoices.iter().map(|i| i.total).sum();
        let paid: Decimal = invoices.iter().map(|i| i.paid).sum();

        let mut by_mode: Vec<ModeTotal> = Vec::new();
        for payment in invoices.iter().flat_map(|i| i.payments.iter()) {
            match by_mode.iter_mut().find(|m| m.mode == payment.mode) {
                Some(m) => m.amount += payment.amount,
                None => by_mode.push(ModeTotal {
                    mode: payment.mode.clone(),
                    amount: payment.amount,
                }),
            }
        }

        Self {
            invoices: invoices.len(),
            billed,
            paid,
            outstanding: (billed - paid).max(Decimal::ZERO),
            by_mode,
        }
    }
}

/// Case-insensitive match on patient name or invoice number. An empty term
/// matches everything.
pub fn matches_search(invoice: &Invoice, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || invoice.patient_name.to_lowercase().contains(&term)
        || invoice.invoice_no.to_lowercase().contains(&term)
}

/// Invoices created within `period` that match `search`, in stored order.
pub fn filter_invoices(invoices: &[Invoice], period: &Period, search: Option<&str>) -> Vec<Invoice> {
    invoices
        .iter()
        .filter(|i| period.includes(i.created_at))
        .filter(|i| search.map_or(true, |s| matches_search(i, s)))
        .cloned()
        .collect()
}
