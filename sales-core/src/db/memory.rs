use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use super::repository::{RepositoryError, SalesRepository};
use super::sample_data::{sample_customers, sample_products};
use crate::models::{BusinessSettings, Customer, InvoiceSummary, Product, StoredInvoice};

#[derive(Debug, Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    customers: BTreeMap<i64, Customer>,
    invoices: BTreeMap<i64, StoredInvoice>,
    settings: BusinessSettings,
    last_invoice_id: i64,
}

/// Process-local [`SalesRepository`]. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    /// Empty catalog and directory, default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loaded with the demonstration products and customers.
    pub fn with_sample_data() -> Self {
        let state = MemoryState {
            products: sample_products().into_iter().map(|p| (p.id, p)).collect(),
            customers: sample_customers().into_iter().map(|c| (c.id, c)).collect(),
            ..Default::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .read()
            .map_err(|e| RepositoryError::Database(format!("memory store poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .write()
            .map_err(|e| RepositoryError::Database(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl SalesRepository for MemoryRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn get_product(
        &self,
        id: i64,
    ) -> Result<Product, RepositoryError> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_product(
        &self,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        self.write()?.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    async fn get_customer(
        &self,
        id: i64,
    ) -> Result<Customer, RepositoryError> {
        self.read()?
            .customers
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_customer(
        &self,
        customer: &Customer,
    ) -> Result<(), RepositoryError> {
        self.write()?.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn save_invoice(
        &self,
        invoice: InvoiceSummary,
    ) -> Result<StoredInvoice, RepositoryError> {
        let mut state = self.write()?;
        state.last_invoice_id += 1;
        let stored = StoredInvoice {
            id: state.last_invoice_id,
            summary: invoice,
        };
        state.invoices.insert(stored.id, stored.clone());
        debug!(id = stored.id, number = %stored.summary.invoice_number, "invoice stored in memory");
        Ok(stored)
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<StoredInvoice, RepositoryError> {
        self.read()?
            .invoices
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_invoices(&self) -> Result<Vec<StoredInvoice>, RepositoryError> {
        Ok(self.read()?.invoices.values().rev().cloned().collect())
    }

    async fn get_settings(&self) -> Result<BusinessSettings, RepositoryError> {
        Ok(self.read()?.settings.clone())
    }

    async fn save_settings(
        &self,
        settings: &BusinessSettings,
    ) -> Result<(), RepositoryError> {
        self.write()?.settings = settings.clone();
        Ok(())
    }
}
