use std::fmt;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// Identifier of a line within one draft. Never reused by that draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u64);

impl LineId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// For rebuilding stored invoice lines. Drafts issue their own ids.
impl From<u64> for LineId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for LineId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The catalog product a line was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub product_id: i64,
    pub name: String,
    pub sku: String,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
        }
    }
}

/// One line on an invoice draft.
///
/// The unit price is captured when the line is created. The line total is
/// always derived from quantity and unit price, so it cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineId,
    product: ProductRef,
    quantity: NonZeroU32,
    unit_price: Decimal,
}

impl LineItem {
    pub(crate) fn new(
        id: LineId,
        product: ProductRef,
        quantity: NonZeroU32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id,
            product,
            quantity,
            unit_price,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity.get()).saturating_mul(self.unit_price)
    }

    pub(crate) fn set_quantity(
        &mut self,
        quantity: NonZeroU32,
    ) {
        self.quantity = quantity;
    }
}
