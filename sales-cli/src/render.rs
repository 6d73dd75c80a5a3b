//! Plain-text views printed by the `sales` commands.

use std::fmt;

use sales_core::calculations::{SalesReport, format_currency};
use sales_core::queries::{categories, inventory_value, low_stock, total_outstanding};
use sales_core::{BusinessSettings, Currency, Customer, InvoiceSummary, Product, StoredInvoice};

pub struct ProductTable<'a> {
    pub products: &'a [Product],
    pub currency: Currency,
}

impl fmt::Display for ProductTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<16} {:<28} {:<16} {:>5}  {:<12} {:>14}",
            "ID", "SKU", "NAME", "CATEGORY", "QTY", "STATUS", "PRICE"
        )?;
        for p in self.products {
            writeln!(
                f,
                "{:>4}  {:<16} {:<28} {:<16} {:>5}  {:<12} {:>14}",
                p.id,
                p.sku,
                p.name,
                p.category,
                p.quantity,
                p.stock_status().label(),
                format_currency(p.price, self.currency)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Products:        {}", self.products.len())?;
        writeln!(f, "Categories:      {}", categories(self.products).join(", "))?;
        writeln!(f, "Low stock:       {}", low_stock(self.products).len())?;
        writeln!(
            f,
            "Inventory value: {}",
            format_currency(inventory_value(self.products), self.currency)
        )
    }
}

pub struct CustomerTable<'a> {
    pub customers: &'a [Customer],
    pub currency: Currency,
}

impl fmt::Display for CustomerTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<26} {:<10} {:<26} {:<18} {:>14}",
            "ID", "NAME", "TYPE", "EMAIL", "PHONE", "OUTSTANDING"
        )?;
        for c in self.customers {
            writeln!(
                f,
                "{:>4}  {:<26} {:<10} {:<26} {:<18} {:>14}",
                c.id,
                c.name,
                c.customer_type.as_str(),
                c.email,
                c.phone,
                format_currency(c.outstanding_balance, self.currency)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Customers:         {}", self.customers.len())?;
        writeln!(
            f,
            "Total outstanding: {}",
            format_currency(total_outstanding(self.customers), self.currency)
        )
    }
}

pub struct InvoiceView<'a> {
    pub summary: &'a InvoiceSummary,
    pub customer: Option<&'a Customer>,
    pub currency: Currency,
}

impl fmt::Display for InvoiceView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.summary;
        let money = |amount| format_currency(amount, self.currency);

        writeln!(f, "Invoice:  {}", s.invoice_number)?;
        writeln!(f, "Date:     {}", s.issued_at.format("%Y-%m-%d %H:%M UTC"))?;
        match self.customer {
            Some(c) => writeln!(f, "Customer: {} (#{})", c.name, c.id)?,
            None => writeln!(f, "Customer: #{}", s.customer_id)?,
        }
        writeln!(f, "Payment:  {}", s.payment_method.label())?;
        writeln!(f)?;

        for line in &s.line_items {
            writeln!(
                f,
                "  {:<28} {:>4} x {:>14} = {:>14}",
                line.product.name,
                line.quantity,
                money(line.unit_price),
                money(line.line_total)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Subtotal:      {:>16}", money(s.subtotal))?;
        writeln!(f, "TVA ({:<6}):  {:>16}", s.tax_rate.to_string(), money(s.tax_amount))?;
        writeln!(f, "Total:         {:>16}", money(s.grand_total))?;
        if !s.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Notes: {}", s.notes)?;
        }
        Ok(())
    }
}

pub struct InvoiceList<'a> {
    pub invoices: &'a [StoredInvoice],
    /// Used to name the top customer.
    pub customers: &'a [Customer],
    pub currency: Currency,
}

impl fmt::Display for InvoiceList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let money = |amount| format_currency(amount, self.currency);

        writeln!(
            f,
            "{:>4}  {:<18} {:<10} {:>8}  {:<14} {:>16}",
            "ID", "NUMBER", "DATE", "CUSTOMER", "PAYMENT", "TOTAL"
        )?;
        for invoice in self.invoices {
            let s = &invoice.summary;
            writeln!(
                f,
                "{:>4}  {:<18} {:<10} {:>8}  {:<14} {:>16}",
                invoice.id,
                s.invoice_number,
                s.issued_at.format("%Y-%m-%d"),
                s.customer_id,
                s.payment_method.as_str(),
                money(s.grand_total)
            )?;
        }

        let report = SalesReport::from_invoices(self.invoices);
        writeln!(f)?;
        writeln!(f, "Invoices:      {}", report.invoice_count)?;
        writeln!(f, "Net sales:     {}", money(report.net_sales))?;
        writeln!(f, "TVA collected: {}", money(report.tax_collected))?;
        writeln!(f, "Revenue:       {}", money(report.revenue))?;
        match report.average_invoice {
            Some(avg) => writeln!(f, "Average:       {}", money(avg))?,
            None => writeln!(f, "Average:       n/a")?,
        }

        if let Some(top) = &report.top_customer {
            let name = self
                .customers
                .iter()
                .find(|c| c.id == top.customer_id)
                .map_or_else(|| format!("#{}", top.customer_id), |c| c.name.clone());
            writeln!(
                f,
                "Top customer:  {name} ({} over {} invoices)",
                money(top.spent),
                top.invoice_count
            )?;
        }
        if !report.top_products.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top products:")?;
            for (rank, p) in report.top_products.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {:<28} {:>6} sold {:>16}",
                    rank + 1,
                    p.name,
                    p.quantity,
                    money(p.revenue)
                )?;
            }
        }
        Ok(())
    }
}

pub struct SettingsView<'a>(pub &'a BusinessSettings);

impl fmt::Display for SettingsView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.0;
        writeln!(f, "Company:             {}", s.company_name)?;
        writeln!(f, "Address:             {}", s.address)?;
        writeln!(f, "Phone:               {}", s.phone)?;
        writeln!(f, "Email:               {}", s.email)?;
        writeln!(f, "Tax ID:              {}", s.tax_id)?;
        writeln!(f, "Currency:            {} ({})", s.currency.code(), s.currency.name())?;
        writeln!(f, "Language:            {}", s.language.code())?;
        writeln!(f, "TVA rate:            {}", s.tva_rate)?;
        writeln!(f, "Low stock threshold: {}", s.low_stock_threshold)?;
        writeln!(f, "Notifications:       {}", on_off(s.enable_notifications))?;
        writeln!(f, "Auto backup:         {}", on_off(s.enable_auto_backup))
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
