//! Aggregates over saved invoices.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::StoredInvoice;

/// Percentage change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero, since the change is undefined.
///
/// ```
/// use rust_decimal_macros::dec;
/// use sales_core::calculations::change_percentage;
///
/// assert_eq!(change_percentage(dec!(115), dec!(100)), Some(dec!(15)));
/// assert_eq!(change_percentage(dec!(50), dec!(0)), None);
/// ```
pub fn change_percentage(
    current: Decimal,
    previous: Decimal,
) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some((current - previous) / previous * Decimal::ONE_HUNDRED)
}

/// How many products [`SalesReport::top_products`] keeps.
pub const TOP_PRODUCTS: usize = 5;

/// Units sold and revenue for one product across invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: i64,
    pub name: String,
    pub quantity: u64,
    /// Σ line totals, before tax.
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSales {
    pub customer_id: i64,
    pub invoice_count: usize,
    /// Σ grand totals.
    pub spent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub invoice_count: usize,
    /// Σ subtotals (before tax).
    pub net_sales: Decimal,
    pub tax_collected: Decimal,
    /// Σ grand totals.
    pub revenue: Decimal,
    pub average_invoice: Option<Decimal>,
    /// Best sellers by revenue, at most [`TOP_PRODUCTS`].
    pub top_products: Vec<ProductSales>,
    pub top_customer: Option<CustomerSales>,
}

impl SalesReport {
    pub fn from_invoices(invoices: &[StoredInvoice]) -> Self {
        let mut report = invoices.iter().fold(Self::default(), |mut acc, invoice| {
            acc.invoice_count += 1;
            acc.net_sales = acc.net_sales.saturating_add(invoice.summary.subtotal);
            acc.tax_collected = acc.tax_collected.saturating_add(invoice.summary.tax_amount);
            acc.revenue = acc.revenue.saturating_add(invoice.summary.grand_total);
            acc
        });

        if report.invoice_count > 0 {
            report.average_invoice = Some(report.revenue / Decimal::from(report.invoice_count));
        }
        report.top_products = top_products(invoices);
        report.top_customer = top_customer(invoices);
        report
    }
}

/// Ties on revenue go to the lower product id.
fn top_products(invoices: &[StoredInvoice]) -> Vec<ProductSales> {
    let mut by_product: HashMap<i64, ProductSales> = HashMap::new();
    for line in invoices.iter().flat_map(|i| &i.summary.line_items) {
        let entry = by_product
            .entry(line.product.product_id)
            .or_insert_with(|| ProductSales {
                product_id: line.product.product_id,
                name: line.product.name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
        entry.quantity += u64::from(line.quantity);
        entry.revenue = entry.revenue.saturating_add(line.line_total);
    }

    let mut ranked: Vec<_> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.product_id.cmp(&b.product_id)));
    ranked.truncate(TOP_PRODUCTS);
    ranked
}

/// Ties on spend go to the lower customer id.
fn top_customer(invoices: &[StoredInvoice]) -> Option<CustomerSales> {
    let mut by_customer: HashMap<i64, CustomerSales> = HashMap::new();
    for invoice in invoices {
        let id = invoice.summary.customer_id;
        let entry = by_customer.entry(id).or_insert(CustomerSales {
            customer_id: id,
            invoice_count: 0,
            spent: Decimal::ZERO,
        });
        entry.invoice_count += 1;
        entry.spent = entry.spent.saturating_add(invoice.summary.grand_total);
    }

    by_customer
        .into_values()
        .min_by(|a, b| b.spent.cmp(&a.spent).then(a.customer_id.cmp(&b.customer_id)))
}
