use rust_decimal::Decimal;

use super::model::InvoiceItem;
use crate::error::Result;
use crate::records::{lab_orders_for, prescriptions_for};
use crate::store::RecordStore;

pub const SOURCE_LAB: &str = "lab";
pub const SOURCE_PRESCRIPTION: &str = "prescription";

/// Candidate line items for a patient: every lab order, then every drug of
/// every prescription, in stored order and priced at zero.
///
/// Items already billed on an earlier invoice are returned again. Staff are
/// expected to remove them by hand.
pub fn billable_items_for<S: RecordStore + ?Sized>(
    store: &S,
    patient_id: &str,
) -> Result<Vec<InvoiceItem>> {
    let mut items = Vec::new();

    for order in lab_orders_for(store, patient_id)? {
        items.push(InvoiceItem {
            description: format!("Lab: {}", order.test_name),
            amount: Decimal::ZERO,
            source: Some(SOURCE_LAB.to_string()),
        });
    }

    for prescription in prescriptions_for(store, patient_id)? {
        for drug in prescription.drugs {
            items.push(InvoiceItem {
                description: format!("Drug: {} ({})", drug.name, drug.dosage),
                amount: Decimal::ZERO,
                source: Some(SOURCE_PRESCRIPTION.to_string()),
            });
        }
    }

    Ok(items)
}
