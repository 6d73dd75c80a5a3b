use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BusinessSettings, Customer, InvoiceSummary, Product, StoredInvoice};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for the catalog, the customer directory, saved invoices and the
/// business settings. The invoicing core only talks to this trait.
#[async_trait]
pub trait SalesRepository: Send + Sync {
    // Product catalog
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product(&self, id: i64) -> Result<Product, RepositoryError>;
    /// Inserts the product, or replaces the existing one with the same id.
    async fn save_product(&self, product: &Product) -> Result<(), RepositoryError>;

    // Customer directory
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn get_customer(&self, id: i64) -> Result<Customer, RepositoryError>;
    async fn save_customer(&self, customer: &Customer) -> Result<(), RepositoryError>;

    // Invoices
    async fn save_invoice(
        &self,
        invoice: InvoiceSummary,
    ) -> Result<StoredInvoice, RepositoryError>;
    async fn get_invoice(&self, id: i64) -> Result<StoredInvoice, RepositoryError>;
    /// Newest first.
    async fn list_invoices(&self) -> Result<Vec<StoredInvoice>, RepositoryError>;

    // Settings
    async fn get_settings(&self) -> Result<BusinessSettings, RepositoryError>;
    async fn save_settings(&self, settings: &BusinessSettings) -> Result<(), RepositoryError>;
}
