//! Table rows as read from SQLite and their conversion into domain models.

use chrono::NaiveDate;
use sales_core::{
    BusinessSettings, Currency, Customer, CustomerType, InvoiceLine, Language, LineId, Product,
    ProductRef, RepositoryError, TaxRate,
};
use sqlx::FromRow;

use crate::decimal::parse_decimal;

#[derive(FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    category: String,
    quantity: i64,
    low_stock_threshold: i64,
    price: String,
    cost: String,
    last_updated: NaiveDate,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            category: row.category,
            quantity: to_u32("quantity", row.quantity)?,
            low_stock_threshold: to_u32("low_stock_threshold", row.low_stock_threshold)?,
            price: parse_decimal("price", &row.price)?,
            cost: parse_decimal("cost", &row.cost)?,
            last_updated: row.last_updated,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    address: String,
    city: String,
    country: String,
    customer_type: String,
    total_purchases: String,
    last_purchase: Option<NaiveDate>,
    outstanding_balance: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let customer_type = CustomerType::parse(&row.customer_type).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid customer type: {}", row.customer_type))
        })?;

        Ok(Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            country: row.country,
            customer_type,
            total_purchases: parse_decimal("total_purchases", &row.total_purchases)?,
            last_purchase: row.last_purchase,
            outstanding_balance: parse_decimal("outstanding_balance", &row.outstanding_balance)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct InvoiceLineRow {
    line_id: i64,
    product_id: i64,
    product_name: String,
    sku: String,
    quantity: i64,
    unit_price: String,
    line_total: String,
}

impl TryFrom<InvoiceLineRow> for InvoiceLine {
    type Error = RepositoryError;

    fn try_from(row: InvoiceLineRow) -> Result<Self, Self::Error> {
        let line_id = u64::try_from(row.line_id)
            .map_err(|_| RepositoryError::Database(format!("Invalid line id: {}", row.line_id)))?;

        Ok(InvoiceLine {
            line_id: LineId::from(line_id),
            product: ProductRef {
                product_id: row.product_id,
                name: row.product_name,
                sku: row.sku,
            },
            quantity: to_u32("quantity", row.quantity)?,
            unit_price: parse_decimal("unit_price", &row.unit_price)?,
            line_total: parse_decimal("line_total", &row.line_total)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct SettingsRow {
    company_name: String,
    address: String,
    phone: String,
    email: String,
    tax_id: String,
    currency: String,
    language: String,
    tva_rate: String,
    low_stock_threshold: i64,
    enable_notifications: bool,
    enable_auto_backup: bool,
}

impl TryFrom<SettingsRow> for BusinessSettings {
    type Error = RepositoryError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let currency = Currency::parse(&row.currency)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid currency: {}", row.currency)))?;
        let language = Language::parse(&row.language)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid language: {}", row.language)))?;

        Ok(BusinessSettings {
            company_name: row.company_name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            tax_id: row.tax_id,
            currency,
            language,
            tva_rate: parse_tax_rate(&row.tva_rate)?,
            low_stock_threshold: to_u32("low_stock_threshold", row.low_stock_threshold)?,
            enable_notifications: row.enable_notifications,
            enable_auto_backup: row.enable_auto_backup,
        })
    }
}

pub(crate) fn parse_tax_rate(text: &str) -> Result<TaxRate, RepositoryError> {
    TaxRate::new(parse_decimal("tax_rate", text)?)
        .map_err(|e| RepositoryError::Database(e.to_string()))
}

fn to_u32(
    column: &str,
    value: i64,
) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Database(format!("Column '{column}' out of range: {value}")))
}
