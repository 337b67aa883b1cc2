use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{BillingError, Result};

/// Parse a user-entered amount such as `1500` or `1,500.50`. Negative values
/// are rejected; zero is allowed.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    let amount = Decimal::from_str(&cleaned).map_err(|_| BillingError::InvalidAmount {
        value: input.to_string(),
        reason: "must be a number".to_string(),
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BillingError::InvalidAmount {
            value: input.to_string(),
            reason: "cannot be negative".to_string(),
        });
    }
    Ok(amount)
}

/// `KES 1,250.00`
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let whole = rounded.trunc();
    let cents = ((rounded - whole).abs() * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u64()
        .unwrap_or(0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!(
        "{} {}{}.{:02}",
        currency,
        sign,
        group_thousands(&whole.abs().to_string()),
        cents
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_and_grouped_amounts() {
        assert_eq!(parse_amount("1500").unwrap(), dec!(1500));
        assert_eq!(parse_amount(" 1,500.50 ").unwrap(), dec!(1500.50));
        assert_eq!(parse_amount("0").unwrap(), dec!(0));
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!(matches!(
            parse_amount("abc"),
            Err(BillingError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("-5"),
            Err(BillingError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn formats_with_grouping_and_cents() {
        assert_eq!(format_money(dec!(1250), "KES"), "KES 1,250.00");
        assert_eq!(format_money(dec!(1234567.5), "KES"), "KES 1,234,567.50");
        assert_eq!(format_money(dec!(0), "KES"), "KES 0.00");
        assert_eq!(format_money(dec!(-200.05), "KES"), "KES -200.05");
    }
}
