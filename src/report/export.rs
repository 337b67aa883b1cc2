use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

use crate::billing::Invoice;
use crate::error::Result;

/// Income report as CSV: one quoted row per invoice under a header row.
pub fn write_invoices_csv<W: Write>(writer: W, invoices: &[Invoice]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(["Invoice", "Patient", "Total", "Paid", "Status"])?;
    for inv in invoices {
        wtr.write_record([
            inv.invoice_no.clone(),
            inv.patient_name.clone(),
            inv.total.to_string(),
            inv.paid.to_string(),
            inv.status.as_str().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
