//! Parsers for command-line values.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use sales_core::{PaymentMethod, TaxRate};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// `--tax-rate` value: a percentage, with or without a trailing `%`.
///
/// A single comma is read as the decimal point (`9,5` is 9.5 %). Percentages
/// never need a thousands separator, so any other use of `,` is rejected.
pub fn parse_tax_rate(s: &str) -> Result<TaxRate, String> {
    let number = s.trim().trim_end_matches('%').trim();
    if number.is_empty() {
        return Err("tax rate is empty".to_string());
    }
    let number = match number.matches(',').count() {
        0 => number.to_string(),
        1 if !number.contains('.') => number.replace(',', "."),
        _ => return Err(format!("invalid tax rate '{}': ambiguous ','", s.trim())),
    };
    let percent = parse_decimal(&number).map_err(|e| e.to_string())?;
    TaxRate::new(percent).map_err(|e| e.to_string())
}

pub fn parse_payment_method(s: &str) -> Result<PaymentMethod, String> {
    PaymentMethod::parse(s.trim()).ok_or_else(|| {
        let known: Vec<_> = PaymentMethod::all().iter().map(|m| m.as_str()).collect();
        format!("unknown payment method '{s}'; expected one of: {}", known.join(", "))
    })
}

/// One `--item PRODUCT_ID[:QTY]` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: i64,
    pub quantity: NonZeroU32,
}

/// Parses `PRODUCT_ID` or `PRODUCT_ID:QTY`. The quantity defaults to 1 and
/// must be at least 1.
pub fn parse_item(s: &str) -> Result<ItemArg, String> {
    let (id, quantity) = match s.split_once(':') {
        Some((id, qty)) => (id, Some(qty)),
        None => (s, None),
    };

    let product_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid product id '{}'", id.trim()))?;

    let quantity = match quantity {
        None => NonZeroU32::MIN,
        Some(q) => q
            .trim()
            .parse::<NonZeroU32>()
            .map_err(|_| format!("quantity must be a whole number of at least 1, got '{}'", q.trim()))?,
    };

    Ok(ItemArg {
        product_id,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn tax_rate_with_and_without_percent_sign() {
        assert_eq!(parse_tax_rate("19").unwrap(), TaxRate::standard_tva());
        assert_eq!(parse_tax_rate("9.5%").unwrap().percent(), dec!(9.5));
    }

    #[test]
    fn tax_rate_comma_is_decimal_point() {
        assert_eq!(parse_tax_rate("9,5").unwrap().percent(), dec!(9.5));
        assert_eq!(parse_tax_rate("7,25 %").unwrap().percent(), dec!(7.25));
    }

    #[test]
    fn tax_rate_ambiguous_comma_is_rejected() {
        let err = parse_tax_rate("1,000.5").unwrap_err();
        assert!(err.contains("ambiguous ','"), "{err}");
        assert!(parse_tax_rate("9,5,1").is_err());
    }

    #[test]
    fn empty_tax_rate_is_rejected() {
        assert!(parse_tax_rate("").is_err());
        assert!(parse_tax_rate(" % ").is_err());
    }

    #[test]
    fn negative_tax_rate_is_rejected() {
        assert!(parse_tax_rate("-1").is_err());
    }

    #[test]
    fn payment_method_names() {
        assert_eq!(parse_payment_method("bank_transfer"), Ok(PaymentMethod::BankTransfer));
        let err = parse_payment_method("bitcoin").unwrap_err();
        assert!(err.contains("cash, card, bank_transfer, check"), "{err}");
    }

    #[test]
    fn item_with_and_without_quantity() {
        assert_eq!(
            parse_item("3"),
            Ok(ItemArg {
                product_id: 3,
                quantity: NonZeroU32::MIN,
            })
        );
        assert_eq!(parse_item("1:2").unwrap().quantity.get(), 2);
    }

    #[test]
    fn item_quantity_must_be_positive() {
        assert!(parse_item("1:0").is_err());
        assert!(parse_item("1:-2").is_err());
        assert!(parse_item("laptop:1").is_err());
    }
}
