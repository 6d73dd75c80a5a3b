//! An invoice being edited before it is saved.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::{InvoiceTotals, TotalsCalculator};
use crate::line_items::{LineItemStore, QuantityUpdate};
use crate::models::{
    BusinessSettings, InvoiceLine, InvoiceNumber, InvoiceSummary, LineId, LineItem, PaymentMethod,
    Product, TaxRate,
};

/// Reasons a draft cannot be saved yet. The draft is left untouched.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("please select a customer")]
    MissingCustomer,

    #[error("please add at least one product")]
    EmptyInvoice,
}

/// A sales invoice under construction.
///
/// Totals are recomputed from the current lines on every call to
/// [`totals`](Self::totals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    invoice_number: InvoiceNumber,
    customer_id: Option<i64>,
    line_items: LineItemStore,
    tax_rate: TaxRate,
    notes: String,
    payment_method: PaymentMethod,
}

impl InvoiceDraft {
    pub fn new(
        invoice_number: InvoiceNumber,
        tax_rate: TaxRate,
    ) -> Self {
        Self {
            invoice_number,
            customer_id: None,
            line_items: LineItemStore::new(),
            tax_rate,
            notes: String::new(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Empty draft numbered from `now`, taxed at the business TVA rate.
    pub fn from_settings(
        settings: &BusinessSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(InvoiceNumber::generate(now), settings.tva_rate)
    }

    pub fn invoice_number(&self) -> &InvoiceNumber {
        &self.invoice_number
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.customer_id
    }

    pub fn line_items(&self) -> &LineItemStore {
        &self.line_items
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn select_customer(
        &mut self,
        customer_id: i64,
    ) {
        debug!(invoice = %self.invoice_number, customer_id, "customer selected");
        self.customer_id = Some(customer_id);
    }

    pub fn clear_customer(&mut self) {
        self.customer_id = None;
    }

    pub fn add(
        &mut self,
        product: &Product,
        quantity: NonZeroU32,
    ) -> LineId {
        let id = self.line_items.add(product, quantity);
        debug!(invoice = %self.invoice_number, line = %id, sku = %product.sku, quantity = quantity.get(), "line added");
        id
    }

    pub fn add_one(
        &mut self,
        product: &Product,
    ) -> LineId {
        self.add(product, NonZeroU32::MIN)
    }

    pub fn update_quantity(
        &mut self,
        id: LineId,
        new_quantity: i64,
    ) -> QuantityUpdate {
        let outcome = self.line_items.update_quantity(id, new_quantity);
        debug!(invoice = %self.invoice_number, line = %id, new_quantity, ?outcome, "quantity updated");
        outcome
    }

    pub fn remove(
        &mut self,
        id: LineId,
    ) -> Option<LineItem> {
        let removed = self.line_items.remove(id);
        debug!(invoice = %self.invoice_number, line = %id, removed = removed.is_some(), "line removed");
        removed
    }

    pub fn set_tax_rate(
        &mut self,
        tax_rate: TaxRate,
    ) {
        debug!(invoice = %self.invoice_number, %tax_rate, "tax rate changed");
        self.tax_rate = tax_rate;
    }

    pub fn set_notes(
        &mut self,
        notes: impl Into<String>,
    ) {
        self.notes = notes.into();
    }

    pub fn set_payment_method(
        &mut self,
        payment_method: PaymentMethod,
    ) {
        self.payment_method = payment_method;
    }

    pub fn totals(&self) -> InvoiceTotals {
        TotalsCalculator::new(self.tax_rate).calculate(self.line_items.items())
    }

    /// Checks the draft can be saved. A missing customer is reported before
    /// an empty item list.
    pub fn validate(&self) -> Result<i64, SaveError> {
        let customer_id = self.customer_id.ok_or(SaveError::MissingCustomer)?;
        if self.line_items.is_empty() {
            return Err(SaveError::EmptyInvoice);
        }
        Ok(customer_id)
    }

    /// Builds the summary to persist. Does not modify the draft.
    pub fn finalize(
        &self,
        issued_at: DateTime<Utc>,
    ) -> Result<InvoiceSummary, SaveError> {
        let customer_id = self.validate()?;
        let totals = self.totals();

        Ok(InvoiceSummary {
            invoice_number: self.invoice_number.clone(),
            customer_id,
            line_items: self.line_items.iter().map(InvoiceLine::from).collect(),
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            grand_total: totals.grand_total,
            tax_rate: self.tax_rate,
            notes: self.notes.clone(),
            payment_method: self.payment_method,
            issued_at,
        })
    }

    /// Back to an empty draft with a fresh number. The tax rate is kept.
    ///
    /// The new number never repeats the old one, even within the same
    /// millisecond.
    pub fn reset(
        &mut self,
        now: DateTime<Utc>,
    ) {
        *self = Self::new(self.invoice_number.next_after(now), self.tax_rate);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn product(
        id: i64,
        price: Decimal,
    ) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            sku: format!("SKU-{id:03}"),
            category: "Electronics".to_string(),
            quantity: 25,
            low_stock_threshold: 10,
            price,
            cost: price,
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft::new(
            InvoiceNumber::from("INV-1".to_string()),
            TaxRate::standard_tva(),
        )
    }

    fn laptop_and_chair() -> InvoiceDraft {
        let mut draft = draft();
        draft.add(&product(1, dec!(85000)), NonZeroU32::new(2).unwrap());
        draft.add_one(&product(2, dec!(15000)));
        draft
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    // =========================================================================
    // totals tests
    // =========================================================================

    #[test]
    fn totals_for_laptop_and_chair() {
        let totals = laptop_and_chair().totals();

        assert_eq!(totals.subtotal, dec!(185000));
        assert_eq!(totals.tax_amount, dec!(35150));
        assert_eq!(totals.grand_total, dec!(220150));
    }

    #[test]
    fn totals_for_empty_draft_are_zero() {
        assert_eq!(draft().totals(), InvoiceTotals::default());
    }

    #[test]
    fn changing_tax_rate_keeps_subtotal() {
        let mut draft = laptop_and_chair();
        let before = draft.totals();

        draft.set_tax_rate(TaxRate::new(dec!(9)).unwrap());
        let after = draft.totals();

        assert_eq!(after.subtotal, before.subtotal);
        assert_eq!(after.tax_amount, dec!(16650));
        assert_eq!(after.grand_total, dec!(201650));
    }

    #[test]
    fn totals_follow_quantity_changes() {
        let mut draft = laptop_and_chair();
        let chair = draft.line_items().items()[1].id();

        draft.update_quantity(chair, 3);

        assert_eq!(draft.totals().subtotal, dec!(215000));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn finalize_without_customer_is_rejected() {
        let draft = laptop_and_chair();

        assert_eq!(draft.finalize(issued_at()), Err(SaveError::MissingCustomer));
    }

    #[test]
    fn missing_customer_is_reported_even_when_empty() {
        assert_eq!(draft().finalize(issued_at()), Err(SaveError::MissingCustomer));
    }

    #[test]
    fn finalize_without_items_is_rejected() {
        let mut draft = draft();
        draft.select_customer(2);

        assert_eq!(draft.finalize(issued_at()), Err(SaveError::EmptyInvoice));
    }

    #[test]
    fn rejected_finalize_leaves_draft_unchanged() {
        let mut draft = draft();
        draft.set_notes("deliver friday");
        let before = draft.clone();

        let _ = draft.finalize(issued_at());

        assert_eq!(draft, before);
    }

    #[test]
    fn finalize_produces_summary() {
        let mut draft = laptop_and_chair();
        draft.select_customer(1);
        draft.set_notes("Net 30");
        draft.set_payment_method(PaymentMethod::BankTransfer);

        let summary = draft.finalize(issued_at()).unwrap();

        assert_eq!(summary.invoice_number.as_str(), "INV-1");
        assert_eq!(summary.customer_id, 1);
        assert_eq!(summary.line_items.len(), 2);
        assert_eq!(summary.line_items[0].line_total, dec!(170000));
        assert_eq!(summary.subtotal, dec!(185000));
        assert_eq!(summary.tax_amount, dec!(35150));
        assert_eq!(summary.grand_total, dec!(220150));
        assert_eq!(summary.tax_rate, TaxRate::standard_tva());
        assert_eq!(summary.notes, "Net 30");
        assert_eq!(summary.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(summary.issued_at, issued_at());
    }

    // =========================================================================
    // lifecycle tests
    // =========================================================================

    #[test]
    fn reset_clears_everything_but_tax_rate() {
        let mut draft = laptop_and_chair();
        draft.select_customer(1);
        draft.set_notes("note");
        draft.set_payment_method(PaymentMethod::Card);
        draft.set_tax_rate(TaxRate::new(dec!(9)).unwrap());

        draft.reset(issued_at());

        assert_eq!(draft.customer_id(), None);
        assert!(draft.line_items().is_empty());
        assert_eq!(draft.notes(), "");
        assert_eq!(draft.payment_method(), PaymentMethod::Cash);
        assert_eq!(draft.tax_rate().percent(), dec!(9));
        assert_eq!(
            draft.invoice_number(),
            &InvoiceNumber::generate(issued_at())
        );
    }

    #[test]
    fn reset_within_same_millisecond_issues_new_number() {
        let mut draft = InvoiceDraft::new(
            InvoiceNumber::generate(issued_at()),
            TaxRate::standard_tva(),
        );
        let first = draft.invoice_number().clone();

        draft.reset(issued_at());
        let second = draft.invoice_number().clone();
        draft.reset(issued_at());

        assert_ne!(second, first);
        assert_ne!(draft.invoice_number(), &second);
        assert_ne!(draft.invoice_number(), &first);
    }

    #[test]
    fn clear_customer_blocks_save_again() {
        let mut draft = laptop_and_chair();
        draft.select_customer(1);
        assert!(draft.validate().is_ok());

        draft.clear_customer();

        assert_eq!(draft.customer_id(), None);
        assert_eq!(draft.finalize(issued_at()), Err(SaveError::MissingCustomer));
        assert_eq!(draft.line_items().len(), 2);
    }

    #[test]
    fn from_settings_uses_business_tva_rate() {
        let settings = BusinessSettings {
            tva_rate: TaxRate::new(dec!(7)).unwrap(),
            ..Default::default()
        };

        let draft = InvoiceDraft::from_settings(&settings, issued_at());

        assert_eq!(draft.tax_rate().percent(), dec!(7));
        assert!(draft.line_items().is_empty());
    }

    #[test]
    fn draft_survives_json_round_trip() {
        let mut draft = laptop_and_chair();
        draft.select_customer(2);

        let json = serde_json::to_string(&draft).unwrap();
        let restored: InvoiceDraft = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, draft);
        assert_eq!(restored.totals(), draft.totals());
    }
}
