//! Orchestrates one draft against the catalog, the customer directory and
//! invoice storage.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::calculations::InvoiceTotals;
use crate::db::repository::{RepositoryError, SalesRepository};
use crate::draft::{InvoiceDraft, SaveError};
use crate::line_items::QuantityUpdate;
use crate::models::{BusinessSettings, LineId, LineItem, PaymentMethod, StoredInvoice, TaxRate};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("customer {0} not found")]
    CustomerNotFound(i64),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The point-of-sale screen's view of an invoice: a draft plus the storage
/// it is looked up against and saved into.
pub struct SaleSession {
    repo: Arc<dyn SalesRepository>,
    draft: InvoiceDraft,
}

impl SaleSession {
    pub fn new(
        repo: Arc<dyn SalesRepository>,
        draft: InvoiceDraft,
    ) -> Self {
        Self { repo, draft }
    }

    /// Empty draft taxed at the stored business TVA rate.
    pub async fn start(repo: Arc<dyn SalesRepository>) -> Result<Self, SessionError> {
        let settings = repo.get_settings().await?;
        Ok(Self::with_settings(repo, &settings))
    }

    pub fn with_settings(
        repo: Arc<dyn SalesRepository>,
        settings: &BusinessSettings,
    ) -> Self {
        let draft = InvoiceDraft::from_settings(settings, Utc::now());
        Self::new(repo, draft)
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn repository(&self) -> &Arc<dyn SalesRepository> {
        &self.repo
    }

    pub async fn add_product(
        &mut self,
        product_id: i64,
        quantity: NonZeroU32,
    ) -> Result<LineId, SessionError> {
        let product = self
            .repo
            .get_product(product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => SessionError::ProductNotFound(product_id),
                other => SessionError::Repository(other),
            })?;
        Ok(self.draft.add(&product, quantity))
    }

    pub async fn select_customer(
        &mut self,
        customer_id: i64,
    ) -> Result<(), SessionError> {
        let customer = self
            .repo
            .get_customer(customer_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => SessionError::CustomerNotFound(customer_id),
                other => SessionError::Repository(other),
            })?;
        self.draft.select_customer(customer.id);
        Ok(())
    }

    pub fn clear_customer(&mut self) {
        self.draft.clear_customer();
    }

    pub fn update_quantity(
        &mut self,
        id: LineId,
        new_quantity: i64,
    ) -> QuantityUpdate {
        self.draft.update_quantity(id, new_quantity)
    }

    pub fn remove(
        &mut self,
        id: LineId,
    ) -> Option<LineItem> {
        self.draft.remove(id)
    }

    pub fn set_tax_rate(
        &mut self,
        tax_rate: TaxRate,
    ) {
        self.draft.set_tax_rate(tax_rate);
    }

    pub fn set_notes(
        &mut self,
        notes: impl Into<String>,
    ) {
        self.draft.set_notes(notes);
    }

    pub fn set_payment_method(
        &mut self,
        payment_method: PaymentMethod,
    ) {
        self.draft.set_payment_method(payment_method);
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.draft.totals()
    }

    pub fn reset(&mut self) {
        self.draft.reset(Utc::now());
    }

    /// Persists the draft and starts a fresh one with the same tax rate.
    ///
    /// On any error the draft is left exactly as it was.
    pub async fn save(&mut self) -> Result<StoredInvoice, SessionError> {
        let summary = self.draft.finalize(Utc::now()).inspect_err(|e| {
            warn!(invoice = %self.draft.invoice_number(), error = %e, "invoice not ready to save");
        })?;

        let stored = self.repo.save_invoice(summary).await?;
        info!(
            id = stored.id,
            number = %stored.summary.invoice_number,
            customer_id = stored.summary.customer_id,
            lines = stored.summary.line_items.len(),
            grand_total = %stored.summary.grand_total,
            "invoice saved"
        );

        self.draft.reset(Utc::now());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::models::{Customer, InvoiceSummary, Product};

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    async fn session() -> SaleSession {
        SaleSession::start(Arc::new(MemoryRepository::with_sample_data()))
            .await
            .unwrap()
    }

    /// Serves the sample catalog but refuses to store invoices.
    struct ReadOnlyRepository(MemoryRepository);

    #[async_trait]
    impl SalesRepository for ReadOnlyRepository {
        async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
            self.0.list_products().await
        }

        async fn get_product(
            &self,
            id: i64,
        ) -> Result<Product, RepositoryError> {
            self.0.get_product(id).await
        }

        async fn save_product(
            &self,
            _product: &Product,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("read only".to_string()))
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
            self.0.list_customers().await
        }

        async fn get_customer(
            &self,
            id: i64,
        ) -> Result<Customer, RepositoryError> {
            self.0.get_customer(id).await
        }

        async fn save_customer(
            &self,
            _customer: &Customer,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("read only".to_string()))
        }

        async fn save_invoice(
            &self,
            _invoice: InvoiceSummary,
        ) -> Result<StoredInvoice, RepositoryError> {
            Err(RepositoryError::Database("read only".to_string()))
        }

        async fn get_invoice(
            &self,
            id: i64,
        ) -> Result<StoredInvoice, RepositoryError> {
            self.0.get_invoice(id).await
        }

        async fn list_invoices(&self) -> Result<Vec<StoredInvoice>, RepositoryError> {
            self.0.list_invoices().await
        }

        async fn get_settings(&self) -> Result<BusinessSettings, RepositoryError> {
            self.0.get_settings().await
        }

        async fn save_settings(
            &self,
            _settings: &BusinessSettings,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("read only".to_string()))
        }
    }

    #[tokio::test]
    async fn start_uses_settings_tax_rate() {
        let repo = Arc::new(MemoryRepository::new());
        let settings = BusinessSettings {
            tva_rate: TaxRate::new(dec!(9)).unwrap(),
            ..Default::default()
        };
        repo.save_settings(&settings).await.unwrap();

        let session = SaleSession::start(repo).await.unwrap();

        assert_eq!(session.draft().tax_rate().percent(), dec!(9));
    }

    #[tokio::test]
    async fn add_product_uses_catalog_price() {
        let mut session = session().await;

        let id = session.add_product(1, qty(2)).await.unwrap();

        let line = session.draft().line_items().get(id).unwrap();
        assert_eq!(line.unit_price(), dec!(85000));
        assert_eq!(line.line_total(), dec!(170000));
    }

    #[tokio::test]
    async fn unknown_product_and_customer_are_reported() {
        let mut session = session().await;

        assert!(matches!(
            session.add_product(99, qty(1)).await,
            Err(SessionError::ProductNotFound(99))
        ));
        assert!(matches!(
            session.select_customer(42).await,
            Err(SessionError::CustomerNotFound(42))
        ));
        assert!(session.draft().line_items().is_empty());
        assert_eq!(session.draft().customer_id(), None);
    }

    #[tokio::test]
    async fn save_without_customer_keeps_draft() {
        let mut session = session().await;
        session.add_product(1, qty(1)).await.unwrap();
        let before = session.draft().clone();

        let result = session.save().await;

        assert!(matches!(result, Err(SessionError::Save(SaveError::MissingCustomer))));
        assert_eq!(session.draft(), &before);
    }

    #[tokio::test]
    async fn cleared_customer_must_be_chosen_again() {
        let mut session = session().await;
        session.select_customer(2).await.unwrap();
        session.add_product(4, qty(1)).await.unwrap();

        session.clear_customer();

        assert_eq!(session.draft().customer_id(), None);
        assert!(matches!(
            session.save().await,
            Err(SessionError::Save(SaveError::MissingCustomer))
        ));
        assert_eq!(session.draft().line_items().len(), 1);
    }

    #[tokio::test]
    async fn save_without_items_is_empty_invoice() {
        let mut session = session().await;
        session.select_customer(1).await.unwrap();

        let result = session.save().await;

        assert!(matches!(result, Err(SessionError::Save(SaveError::EmptyInvoice))));
    }

    #[tokio::test]
    async fn save_persists_and_resets() {
        let mut session = session().await;
        session.select_customer(2).await.unwrap();
        session.add_product(1, qty(2)).await.unwrap();
        session.add_product(2, qty(1)).await.unwrap();
        session.set_notes("Delivery Monday");
        session.set_payment_method(PaymentMethod::BankTransfer);

        let stored = session.save().await.unwrap();

        assert_eq!(stored.summary.customer_id, 2);
        assert_eq!(stored.summary.line_items.len(), 2);
        assert_eq!(stored.summary.subtotal, dec!(185000));
        assert_eq!(stored.summary.tax_amount, dec!(35150));
        assert_eq!(stored.summary.grand_total, dec!(220150));
        assert_eq!(stored.summary.notes, "Delivery Monday");
        assert_eq!(stored.summary.payment_method, PaymentMethod::BankTransfer);

        let saved = session.repository().get_invoice(stored.id).await.unwrap();
        assert_eq!(saved, stored);

        assert!(session.draft().line_items().is_empty());
        assert_eq!(session.draft().customer_id(), None);
        assert_eq!(session.draft().notes(), "");
        assert_eq!(session.draft().payment_method(), PaymentMethod::Cash);
        assert_eq!(session.draft().tax_rate(), TaxRate::standard_tva());
    }

    #[tokio::test]
    async fn consecutive_saves_get_distinct_numbers() {
        let mut session = session().await;
        let mut numbers = Vec::new();
        for _ in 0..20 {
            session.select_customer(1).await.unwrap();
            session.add_product(4, qty(1)).await.unwrap();
            numbers.push(session.save().await.unwrap().summary.invoice_number);
        }

        let mut unique = numbers.clone();
        unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        unique.dedup();
        assert_eq!(unique.len(), numbers.len());
    }

    #[tokio::test]
    async fn repository_failure_keeps_draft() {
        let repo = Arc::new(ReadOnlyRepository(MemoryRepository::with_sample_data()));
        let mut session = SaleSession::start(repo).await.unwrap();
        session.select_customer(1).await.unwrap();
        session.add_product(3, qty(4)).await.unwrap();
        let before = session.draft().clone();

        let result = session.save().await;

        assert!(matches!(result, Err(SessionError::Repository(RepositoryError::Database(_)))));
        assert_eq!(session.draft(), &before);
    }

    #[tokio::test]
    async fn delegated_edits_update_totals() {
        let mut session = session().await;
        let laptop = session.add_product(1, qty(1)).await.unwrap();
        let mouse = session.add_product(3, qty(2)).await.unwrap();

        assert_eq!(session.update_quantity(laptop, 0), QuantityUpdate::Removed);
        session.set_tax_rate(TaxRate::ZERO);

        let totals = session.totals();
        assert_eq!(totals.subtotal, dec!(5000));
        assert_eq!(totals.grand_total, dec!(5000));
        assert!(session.remove(mouse).is_some());
        assert_eq!(session.totals(), InvoiceTotals::default());
    }
}
