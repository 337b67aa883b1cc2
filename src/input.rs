//! Validation of user input before it reaches the ledger.

use rust_decimal::Decimal;

use crate::billing::{parse_amount, InvoiceItem};
use crate::error::{BillingError, Result};

/// Parse item input like "Consultation:1500" into a line item. The amount is
/// taken after the last colon so descriptions such as "Lab: CBC:800" work.
pub fn parse_item_input(input: &str) -> Result<InvoiceItem> {
    let (description, amount) = input
        .rsplit_once(':')
        .ok_or_else(|| BillingError::InvalidItemFormat(input.to_string()))?;
    let description = description.trim();
    if description.is_empty() {
        return Err(BillingError::InvalidItemFormat(input.to_string()));
    }
    Ok(InvoiceItem::new(description, parse_amount(amount)?))
}

/// Parse every `--item`, refusing an empty list.
pub fn parse_items(inputs: &[String]) -> Result<Vec<InvoiceItem>> {
    let items = inputs
        .iter()
        .map(|i| parse_item_input(i))
        .collect::<Result<Vec<_>>>()?;
    if items.is_empty() {
        return Err(BillingError::NoItems);
    }
    Ok(items)
}

/// Drop items without a description.
pub fn retain_described(items: Vec<InvoiceItem>) -> Vec<InvoiceItem> {
    items
        .into_iter()
        .filter(|i| !i.description.trim().is_empty())
        .collect()
}

/// Resolve a payment mode against the configured list, case-insensitively,
/// returning the configured spelling.
pub fn resolve_payment_mode(mode: Option<&str>, modes: &[String]) -> Result<String> {
    let mode = mode.map(str::trim).filter(|m| !m.is_empty()).ok_or(BillingError::NoPaymentMode)?;
    modes
        .iter()
        .find(|m| m.eq_ignore_ascii_case(mode))
        .cloned()
        .ok_or_else(|| BillingError::UnknownPaymentMode(mode.to_string()))
}

/// A payment being recorded must be for more than zero.
pub fn require_positive(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::InvalidPaymentAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn splits_on_last_colon() {
        let item = parse_item_input("Lab: CBC:800").unwrap();
        assert_eq!(item.description, "Lab: CBC");
        assert_eq!(item.amount, dec!(800));
        assert!(item.source.is_none());
    }

    #[test]
    fn rejects_bad_items() {
        assert!(matches!(
            parse_item_input("Consultation"),
            Err(BillingError::InvalidItemFormat(_))
        ));
        assert!(matches!(
            parse_item_input(":500"),
            Err(BillingError::InvalidItemFormat(_))
        ));
        assert!(matches!(
            parse_item_input("Consultation:abc"),
            Err(BillingError::InvalidAmount { .. })
        ));
        assert!(matches!(parse_items(&[]), Err(BillingError::NoItems)));
    }

    #[test]
    fn payment_mode_must_be_configured() {
        let modes = vec!["M-Pesa".to_string(), "Cash".to_string()];
        assert!(resolve_payment_mode(Some("mpesa"), &modes).is_err());
        assert_eq!(resolve_payment_mode(Some("m-pesa"), &modes).unwrap(), "M-Pesa");
        assert!(matches!(
            resolve_payment_mode(Some("  "), &modes),
            Err(BillingError::NoPaymentMode)
        ));
        assert!(matches!(
            resolve_payment_mode(None, &modes),
            Err(BillingError::NoPaymentMode)
        ));
    }

    #[test]
    fn zero_payment_is_rejected() {
        assert!(matches!(
            require_positive(dec!(0)),
            Err(BillingError::InvalidPaymentAmount)
        ));
        assert_eq!(require_positive(dec!(1)).unwrap(), dec!(1));
    }
}
