use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use sales_core::db::{MemoryRepositoryFactory, RepositoryRegistry};
use sales_core::queries::{CustomerFilter, CustomerSegment, ProductFilter, low_stock};
use sales_core::{
    Currency, Customer, InvoiceSummary, PaymentMethod, Product, SaleSession, SalesRepository,
    TaxRate,
};
use sales_db_sqlite::SqliteRepositoryFactory;

use crate::config::AppConfig;
use crate::render::{CustomerTable, InvoiceList, InvoiceView, ProductTable, SettingsView};
use crate::utils::ItemArg;

/// Every storage backend the CLI can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the configured backend and stores the `[business]` section, if
/// any, as the current settings.
pub async fn open_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn SalesRepository>> {
    debug!(backend = %config.database.backend, "opening repository");
    let registry = build_registry();
    let repo: Arc<dyn SalesRepository> = Arc::from(
        registry
            .create(&config.database)
            .await
            .with_context(|| format!("cannot open '{}' backend", config.database.backend))?,
    );

    if let Some(business) = &config.business {
        repo.save_settings(business)
            .await
            .context("cannot store [business] settings")?;
        info!(company = %business.company_name, "business settings applied");
    }

    Ok(repo)
}

async fn currency(repo: &dyn SalesRepository) -> anyhow::Result<Currency> {
    Ok(repo.get_settings().await?.currency)
}

pub async fn products(
    repo: &dyn SalesRepository,
    filter: &ProductFilter,
    low_stock_only: bool,
) -> anyhow::Result<String> {
    let all = repo.list_products().await?;
    let matching: Vec<Product> = filter.apply(&all).into_iter().cloned().collect();
    let selected: Vec<Product> = if low_stock_only {
        low_stock(&matching).into_iter().cloned().collect()
    } else {
        matching
    };

    Ok(ProductTable {
        products: &selected,
        currency: currency(repo).await?,
    }
    .to_string())
}

pub async fn customers(
    repo: &dyn SalesRepository,
    filter: &CustomerFilter,
) -> anyhow::Result<String> {
    let all = repo.list_customers().await?;
    let selected: Vec<_> = filter.apply(&all).into_iter().cloned().collect();

    let mut out = format!("{}\n\n", filter.segment.label());
    out.push_str(
        &CustomerTable {
            customers: &selected,
            currency: currency(repo).await?,
        }
        .to_string(),
    );
    Ok(out)
}

/// Everything the `invoice` command needs to build a draft.
#[derive(Debug, Clone, Default)]
pub struct InvoiceRequest {
    pub customer_id: i64,
    pub items: Vec<ItemArg>,
    /// Falls back to the stored business TVA rate.
    pub tax_rate: Option<TaxRate>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub dry_run: bool,
}

/// A built invoice, saved or not.
#[derive(Debug, Clone)]
pub struct InvoiceOutcome {
    /// Storage id, `None` for a dry run.
    pub id: Option<i64>,
    pub summary: InvoiceSummary,
    pub customer: Customer,
    pub currency: Currency,
}

#[derive(Serialize)]
struct InvoiceJson<'a> {
    id: Option<i64>,
    saved: bool,
    #[serde(flatten)]
    summary: &'a InvoiceSummary,
}

impl InvoiceOutcome {
    pub fn to_text(&self) -> String {
        let heading = match self.id {
            Some(id) => format!("Saved invoice #{id}"),
            None => "Dry run, invoice not saved".to_string(),
        };
        let view = InvoiceView {
            summary: &self.summary,
            customer: Some(&self.customer),
            currency: self.currency,
        };
        format!("{heading}\n\n{view}")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let json = InvoiceJson {
            id: self.id,
            saved: self.id.is_some(),
            summary: &self.summary,
        };
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Builds a draft from `request` through a [`SaleSession`] and saves it
/// unless `dry_run` is set.
pub async fn create_invoice(
    repo: Arc<dyn SalesRepository>,
    request: &InvoiceRequest,
) -> anyhow::Result<InvoiceOutcome> {
    let settings = repo.get_settings().await?;
    let mut session = SaleSession::with_settings(Arc::clone(&repo), &settings);

    session.select_customer(request.customer_id).await?;
    for item in &request.items {
        session.add_product(item.product_id, item.quantity).await?;
    }
    if let Some(rate) = request.tax_rate {
        session.set_tax_rate(rate);
    }
    session.set_payment_method(request.payment_method);
    if let Some(notes) = &request.notes {
        session.set_notes(notes.as_str());
    }

    let customer = repo.get_customer(request.customer_id).await?;

    let (id, summary) = if request.dry_run {
        (None, session.draft().finalize(Utc::now())?)
    } else {
        let stored = session.save().await?;
        (Some(stored.id), stored.summary)
    };

    Ok(InvoiceOutcome {
        id,
        summary,
        customer,
        currency: settings.currency,
    })
}

/// All saved invoices with a sales report, or a single invoice when `id` is
/// given.
pub async fn invoices(
    repo: &dyn SalesRepository,
    id: Option<i64>,
) -> anyhow::Result<String> {
    let currency = currency(repo).await?;

    match id {
        Some(id) => {
            let stored = repo
                .get_invoice(id)
                .await
                .with_context(|| format!("invoice {id}"))?;
            let customer = repo.get_customer(stored.summary.customer_id).await.ok();
            Ok(InvoiceView {
                summary: &stored.summary,
                customer: customer.as_ref(),
                currency,
            }
            .to_string())
        }
        None => {
            let invoices = repo.list_invoices().await?;
            let customers = repo.list_customers().await?;
            Ok(InvoiceList {
                invoices: &invoices,
                customers: &customers,
                currency,
            }
            .to_string())
        }
    }
}

pub async fn settings(repo: &dyn SalesRepository) -> anyhow::Result<String> {
    let settings = repo.get_settings().await?;
    Ok(SettingsView(&settings).to_string())
}

pub fn parse_segment(s: &str) -> Result<CustomerSegment, String> {
    CustomerSegment::parse(&s.trim().to_lowercase())
        .ok_or_else(|| format!("unknown segment '{s}'; expected all, individual, business or outstanding"))
}
