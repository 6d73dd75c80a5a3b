//! Invoice arithmetic.
//!
//! All amounts are exact [`rust_decimal::Decimal`] values. Rounding to a
//! currency's smallest unit happens only in [`formatting`] or when a caller
//! asks for [`InvoiceTotals::rounded`].

pub mod common;
pub mod formatting;
pub mod reports;
pub mod totals;

pub use formatting::format_currency;
pub use reports::{CustomerSales, ProductSales, SalesReport, TOP_PRODUCTS, change_percentage};
pub use totals::{InvoiceTotals, TotalsCalculator};
