use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a tax rate percentage is negative.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("tax rate must not be negative, got {0}%")]
pub struct InvalidTaxRate(pub Decimal);

/// A flat tax rate expressed as a percentage (`19` means 19 %).
///
/// The percentage is never negative. Serialized as the bare percentage so it
/// reads naturally in configuration files (`tva_rate = 19`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub const ZERO: TaxRate = TaxRate(Decimal::ZERO);

    pub fn new(percent: Decimal) -> Result<Self, InvalidTaxRate> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(InvalidTaxRate(percent));
        }
        Ok(Self(percent))
    }

    /// The rate applied to new invoices when no business setting says otherwise.
    pub fn standard_tva() -> Self {
        Self(Decimal::from(19))
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Tax owed on `amount` at this rate, unrounded. Saturates rather than
    /// overflowing.
    pub fn apply(
        &self,
        amount: Decimal,
    ) -> Decimal {
        amount
            .checked_mul(self.0)
            .map(|product| product / Decimal::ONE_HUNDRED)
            .unwrap_or_else(|| (amount / Decimal::ONE_HUNDRED).saturating_mul(self.0))
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = InvalidTaxRate;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl fmt::Display for TaxRate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
