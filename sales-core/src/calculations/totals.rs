//! Invoice totals derived from the current line items and tax rate.
//!
//! Totals are never stored on the draft. Every read recomputes them from the
//! lines, so repeated edits cannot accumulate drift.
//!
//! | Value         | Derivation                          |
//! |---------------|-------------------------------------|
//! | `subtotal`    | Σ quantity × unit price (0 if none) |
//! | `tax_amount`  | subtotal × rate / 100               |
//! | `grand_total` | subtotal + tax_amount               |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use sales_core::TaxRate;
//! use sales_core::calculations::TotalsCalculator;
//!
//! let calculator = TotalsCalculator::new(TaxRate::new(dec!(19)).unwrap());
//! let totals = calculator.calculate_amounts([dec!(170000), dec!(15000)]);
//!
//! assert_eq!(totals.subtotal, dec!(185000));
//! assert_eq!(totals.tax_amount, dec!(35150));
//! assert_eq!(totals.grand_total, dec!(220150));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::{Currency, LineItem, TaxRate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    /// Each amount rounded to the currency's smallest unit, for output.
    ///
    /// The rounded grand total is rounded from the exact grand total, not
    /// summed from the rounded parts.
    pub fn rounded(
        &self,
        currency: Currency,
    ) -> Self {
        let dp = currency.minor_units();
        Self {
            subtotal: round_half_up(self.subtotal, dp),
            tax_amount: round_half_up(self.tax_amount, dp),
            grand_total: round_half_up(self.grand_total, dp),
        }
    }
}

/// Computes [`InvoiceTotals`] at a fixed tax rate.
#[derive(Debug, Clone, Copy)]
pub struct TotalsCalculator {
    tax_rate: TaxRate,
}

impl TotalsCalculator {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self { tax_rate }
    }

    pub fn calculate(
        &self,
        items: &[LineItem],
    ) -> InvoiceTotals {
        self.calculate_amounts(items.iter().map(LineItem::line_total))
    }

    /// Same as [`calculate`](Self::calculate) but over bare line totals.
    pub fn calculate_amounts<I>(
        &self,
        line_totals: I,
    ) -> InvoiceTotals
    where
        I: IntoIterator<Item = Decimal>,
    {
        let subtotal = self.subtotal(line_totals);
        let tax_amount = self.tax_amount(subtotal);
        let grand_total = self.grand_total(subtotal, tax_amount);

        InvoiceTotals {
            subtotal,
            tax_amount,
            grand_total,
        }
    }

    fn subtotal<I>(
        &self,
        line_totals: I,
    ) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        line_totals
            .into_iter()
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    fn tax_amount(
        &self,
        subtotal: Decimal,
    ) -> Decimal {
        self.tax_rate.apply(subtotal)
    }

    fn grand_total(
        &self,
        subtotal: Decimal,
        tax_amount: Decimal,
    ) -> Decimal {
        subtotal.saturating_add(tax_amount)
    }
}
