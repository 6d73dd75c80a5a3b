//! Loads the on-disk `sales.toml` fixture and drives the command handlers
//! with it.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sales_cli::app::{self, InvoiceRequest};
use sales_cli::config::AppConfig;
use sales_cli::utils::ItemArg;
use sales_core::Currency;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sales.toml")
}

/// The fixture points at a SQLite file; tests run against memory instead.
fn in_memory_config() -> AppConfig {
    let mut config = AppConfig::load(Some(&fixture_path())).unwrap();
    config.apply_overrides(Some("memory".to_string()), None, None);
    config
}

#[test]
fn fixture_sections_are_read() {
    let config = AppConfig::load(Some(&fixture_path())).unwrap();

    assert_eq!(config.database.backend, "sqlite");
    assert_eq!(config.database.connection_string, "sales.db");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("sales.log")));

    let business = config.business.unwrap();
    assert_eq!(business.company_name, "Atlas Trading SARL");
    assert_eq!(business.currency, Currency::Mad);
    assert_eq!(business.tva_rate.percent(), dec!(20));
    // Not in the fixture.
    assert_eq!(business.low_stock_threshold, 10);
}

#[tokio::test]
async fn business_section_drives_invoice_tax_and_currency() {
    let repo = app::open_repository(&in_memory_config()).await.unwrap();
    let request = InvoiceRequest {
        customer_id: 1,
        items: vec![ItemArg {
            product_id: 4,
            quantity: NonZeroU32::new(10).unwrap(),
        }],
        ..Default::default()
    };

    let outcome = app::create_invoice(Arc::clone(&repo), &request).await.unwrap();

    assert_eq!(outcome.summary.subtotal, dec!(8000));
    assert_eq!(outcome.summary.tax_amount, dec!(1600));
    assert_eq!(outcome.summary.grand_total, dec!(9600));
    assert_eq!(outcome.currency, Currency::Mad);
    assert!(outcome.to_text().contains("9,600 MAD"));
}

#[tokio::test]
async fn settings_command_shows_configured_company() {
    let repo = app::open_repository(&in_memory_config()).await.unwrap();

    let text = app::settings(repo.as_ref()).await.unwrap();

    assert!(text.contains("Company:             Atlas Trading SARL"), "{text}");
    assert!(text.contains("TVA rate:            20%"));
}

#[tokio::test]
async fn sqlite_backend_in_memory() {
    let mut config = in_memory_config();
    config.apply_overrides(Some("sqlite".to_string()), Some(":memory:".to_string()), None);
    let repo = app::open_repository(&config).await.unwrap();

    let text = app::invoices(repo.as_ref(), None).await.unwrap();

    assert!(text.contains("Invoices:      0"), "{text}");
    assert!(text.contains("Revenue:       0 MAD"));
}
