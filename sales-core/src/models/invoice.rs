use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineId, LineItem, ProductRef, TaxRate};
use crate::calculations::InvoiceTotals;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    Check,
}

impl PaymentMethod {
    pub fn all() -> &'static [PaymentMethod] {
        &[
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::BankTransfer,
            PaymentMethod::Check,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Check => "check",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "bank_transfer" => Some(Self::BankTransfer),
            "check" => Some(Self::Check),
            _ => None,
        }
    }

    /// Bilingual label shown to the cashier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash / Espèces",
            Self::Card => "Credit Card / Carte",
            Self::BankTransfer => "Bank Transfer / Virement",
            Self::Check => "Check / Chèque",
        }
    }
}

/// Human-facing invoice number of the form `INV-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self::from_millis(at.timestamp_millis())
    }

    /// Number for a draft started at `at` after this one. Always differs from
    /// `self`: when `at` is not past this number's millisecond, the next
    /// millisecond is used.
    pub fn next_after(
        &self,
        at: DateTime<Utc>,
    ) -> Self {
        let now = at.timestamp_millis();
        match self.millis() {
            Some(previous) if previous >= now => Self::from_millis(previous.saturating_add(1)),
            _ => Self::from_millis(now),
        }
    }

    fn from_millis(millis: i64) -> Self {
        Self(format!("INV-{millis}"))
    }

    fn millis(&self) -> Option<i64> {
        self.0.strip_prefix("INV-")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InvoiceNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line as recorded on a saved invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_id: LineId,
    pub product: ProductRef,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&LineItem> for InvoiceLine {
    fn from(item: &LineItem) -> Self {
        Self {
            line_id: item.id(),
            product: item.product().clone(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            line_total: item.line_total(),
        }
    }
}

/// The record handed to persistence when a draft is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub invoice_number: InvoiceNumber,
    pub customer_id: i64,
    pub line_items: Vec<InvoiceLine>,

    // Totals, unrounded
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,

    pub tax_rate: TaxRate,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub issued_at: DateTime<Utc>,
}

impl InvoiceSummary {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            grand_total: self.grand_total,
        }
    }
}

/// A saved invoice together with the id the repository assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredInvoice {
    pub id: i64,
    #[serde(flatten)]
    pub summary: InvoiceSummary,
}
