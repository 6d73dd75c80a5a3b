use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog entry that line items can be created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Stock-keeping code, e.g. `DELL-INS-15-001`.
    pub sku: String,
    pub category: String,

    // Inventory
    pub quantity: u32,
    pub low_stock_threshold: u32,

    // Pricing
    pub price: Decimal,
    pub cost: Decimal,

    pub last_updated: NaiveDate,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::of(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn of(product: &Product) -> Self {
        if product.quantity == 0 {
            Self::OutOfStock
        } else if product.quantity <= product.low_stock_threshold {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }
}
