use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::models::Currency;

/// Formats an amount for display, e.g. `220150` → `"220,150 DZD"`.
///
/// The amount is rounded to the currency's smallest unit, trailing zeros are
/// dropped and the integer part is grouped by thousands.
pub fn format_currency(
    amount: Decimal,
    currency: Currency,
) -> String {
    let rounded = round_half_up(amount, currency.minor_units()).normalize();
    format!("{} {}", group_thousands(rounded), currency.code())
}

fn group_thousands(value: Decimal) -> String {
    let digits = value.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
