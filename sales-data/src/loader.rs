//! CSV import for the product catalog.
//!
//! | Column                | Required | Type    | Notes                            |
//! |-----------------------|----------|---------|----------------------------------|
//! | `id`                  | yes      | integer | existing ids are overwritten     |
//! | `name`                | yes      | string  |                                  |
//! | `sku`                 | yes      | string  | unique within the file           |
//! | `category`            | yes      | string  |                                  |
//! | `quantity`            | yes      | integer | units on hand                    |
//! | `price`               | yes      | decimal | selling price, not negative      |
//! | `cost`                | yes      | decimal | purchase cost, not negative      |
//! | `low_stock_threshold` | no       | integer | empty cell means 10              |
//! | `last_updated`        | yes      | date    | `YYYY-MM-DD`                     |
//!
//! ```csv
//! id,name,sku,category,quantity,price,cost,low_stock_threshold,last_updated
//! 3,Wireless Mouse Logitech,LOGI-MOUSE-001,Electronics,3,2500,1800,10,2024-01-13
//! ```

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_core::{Product, RepositoryError, SalesRepository};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Upper bound for `price` and `cost`, in whole currency units.
pub const MAX_CATALOG_AMOUNT: i64 = 1_000_000_000_000;

/// Errors that can occur when loading catalog data. Row numbers are 1-based
/// and count data rows only.
#[derive(Debug, Error)]
pub enum CatalogLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("negative {column} on row {row}")]
    NegativeAmount { column: &'static str, row: usize },

    #[error("{column} on row {row} exceeds {}", MAX_CATALOG_AMOUNT)]
    AmountTooLarge { column: &'static str, row: usize },

    #[error("SKU '{sku}' on row {row} already used on row {first_row}")]
    DuplicateSku {
        sku: String,
        row: usize,
        first_row: usize,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for CatalogLoaderError {
    fn from(err: csv::Error) -> Self {
        CatalogLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the catalog CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub quantity: u32,
    pub price: Decimal,
    pub cost: Decimal,
    pub low_stock_threshold: Option<u32>,
    pub last_updated: NaiveDate,
}

impl From<CatalogRecord> for Product {
    fn from(record: CatalogRecord) -> Self {
        Product {
            id: record.id,
            name: record.name,
            sku: record.sku,
            category: record.category,
            quantity: record.quantity,
            low_stock_threshold: record
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            price: record.price,
            cost: record.cost,
            last_updated: record.last_updated,
        }
    }
}

fn check_amount(
    column: &'static str,
    amount: Decimal,
    row: usize,
) -> Result<(), CatalogLoaderError> {
    if amount < Decimal::ZERO {
        return Err(CatalogLoaderError::NegativeAmount { column, row });
    }
    if amount > Decimal::from(MAX_CATALOG_AMOUNT) {
        return Err(CatalogLoaderError::AmountTooLarge { column, row });
    }
    Ok(())
}

/// Loader for catalog data from CSV files.
///
/// Products are written through [`SalesRepository`], so any registered
/// backend can be the target.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse and validate catalog records from a CSV reader.
    ///
    /// The whole file is rejected if any row has a price or cost that is
    /// negative or above [`MAX_CATALOG_AMOUNT`], or reuses a SKU from an
    /// earlier row.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CatalogRecord>, CatalogLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        let mut seen_skus: HashMap<String, usize> = HashMap::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let row = index + 1;
            let record: CatalogRecord = result?;

            check_amount("price", record.price, row)?;
            check_amount("cost", record.cost, row)?;
            if let Some(&first_row) = seen_skus.get(&record.sku) {
                return Err(CatalogLoaderError::DuplicateSku {
                    sku: record.sku,
                    row,
                    first_row,
                });
            }
            seen_skus.insert(record.sku.clone(), row);
            records.push(record);
        }

        debug!(records = records.len(), "catalog CSV parsed");
        Ok(records)
    }

    /// Upsert every record into the repository.
    ///
    /// Products are keyed by id, so loading the same file twice leaves the
    /// catalog unchanged. Returns the number of products written.
    pub async fn load<R: SalesRepository + ?Sized>(
        repo: &R,
        records: &[CatalogRecord],
    ) -> Result<usize, CatalogLoaderError> {
        for record in records {
            let product = Product::from(record.clone());
            repo.save_product(&product).await?;
        }

        info!(products = records.len(), "catalog loaded");
        Ok(records.len())
    }
}
