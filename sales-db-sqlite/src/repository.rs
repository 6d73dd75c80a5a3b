use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sales_core::{
    BusinessSettings, Customer, InvoiceLine, InvoiceNumber, InvoiceSummary, PaymentMethod,
    Product, RepositoryError, SalesRepository, StoredInvoice,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::decimal::get_decimal;
use crate::rows::{CustomerRow, InvoiceLineRow, ProductRow, SettingsRow, parse_tax_rate};

const IN_MEMORY: &str = ":memory:";

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open the database named by `connection_string`.
    ///
    /// Accepts a bare file path (created if missing), a `sqlite:` URL, or
    /// `:memory:`. An in-memory database is held on a single connection so
    /// every query sees the same data.
    pub async fn new(connection_string: &str) -> Result<Self, RepositoryError> {
        let in_memory = connection_string == IN_MEMORY || connection_string == "sqlite::memory:";

        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else if connection_string.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(connection_string).map(|o| o.create_if_missing(true))
        } else {
            Ok(SqliteConnectOptions::new()
                .filename(connection_string)
                .create_if_missing(true))
        }
        .map_err(|e| RepositoryError::Connection(e.to_string()))?
        .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .map_err(|e| {
                RepositoryError::Connection(format!(
                    "Failed to connect to database '{}': {}",
                    connection_string, e
                ))
            })?;

        debug!(connection_string, "sqlite pool opened");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {e}")))?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<(), RepositoryError> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .map_err(|e| {
                RepositoryError::Configuration(format!(
                    "Failed to read seeds directory '{}': {}",
                    seeds_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path).map_err(|e| {
                RepositoryError::Configuration(format!(
                    "Failed to read seed file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            sqlx::raw_sql(&sql).execute(&self.pool).await.map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to execute seed file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!(seed = %path.display(), "seed file applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn invoice_lines(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<InvoiceLine>, RepositoryError> {
        let rows: Vec<InvoiceLineRow> = sqlx::query_as(
            "SELECT line_id, product_id, product_name, sku, quantity, unit_price, line_total
             FROM invoice_lines WHERE invoice_id = ? ORDER BY line_id",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn with_lines(
        &self,
        mut invoice: StoredInvoice,
    ) -> Result<StoredInvoice, RepositoryError> {
        invoice.summary.line_items = self.invoice_lines(invoice.id).await?;
        Ok(invoice)
    }
}

/// Invoice header without its lines.
fn row_to_invoice_header(row: &SqliteRow) -> Result<StoredInvoice, RepositoryError> {
    let payment: String = row.try_get("payment_method").map_err(db_err)?;
    let payment_method = PaymentMethod::parse(&payment)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid payment method: {}", payment)))?;
    let tax_rate: String = row.try_get("tax_rate").map_err(db_err)?;

    Ok(StoredInvoice {
        id: row.try_get("id").map_err(db_err)?,
        summary: InvoiceSummary {
            invoice_number: InvoiceNumber::from(
                row.try_get::<String, _>("invoice_number").map_err(db_err)?,
            ),
            customer_id: row.try_get("customer_id").map_err(db_err)?,
            line_items: Vec::new(),
            subtotal: get_decimal(row, "subtotal")?,
            tax_amount: get_decimal(row, "tax_amount")?,
            grand_total: get_decimal(row, "grand_total")?,
            tax_rate: parse_tax_rate(&tax_rate)?,
            notes: row.try_get("notes").map_err(db_err)?,
            payment_method,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| RepositoryError::Database(format!("Failed to get issued_at: {}", e)))?,
        },
    })
}

const INVOICE_COLUMNS: &str = "id, invoice_number, customer_id, subtotal, tax_amount, grand_total,
     tax_rate, notes, payment_method, issued_at";

#[async_trait]
impl SalesRepository for SqliteRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, sku, category, quantity, low_stock_threshold, price, cost, last_updated
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_product(
        &self,
        id: i64,
    ) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            "SELECT id, name, sku, category, quantity, low_stock_threshold, price, cost, last_updated
             FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn save_product(
        &self,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products
                (id, name, sku, category, quantity, low_stock_threshold, price, cost, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                sku = excluded.sku,
                category = excluded.category,
                quantity = excluded.quantity,
                low_stock_threshold = excluded.low_stock_threshold,
                price = excluded.price,
                cost = excluded.cost,
                last_updated = excluded.last_updated",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.price.to_string())
        .bind(product.cost.to_string())
        .bind(product.last_updated)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            "SELECT id, name, email, phone, address, city, country, customer_type,
                    total_purchases, last_purchase, outstanding_balance
             FROM customers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_customer(
        &self,
        id: i64,
    ) -> Result<Customer, RepositoryError> {
        let row: CustomerRow = sqlx::query_as(
            "SELECT id, name, email, phone, address, city, country, customer_type,
                    total_purchases, last_purchase, outstanding_balance
             FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn save_customer(
        &self,
        customer: &Customer,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO customers
                (id, name, email, phone, address, city, country, customer_type,
                 total_purchases, last_purchase, outstanding_balance)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                address = excluded.address,
                city = excluded.city,
                country = excluded.country,
                customer_type = excluded.customer_type,
                total_purchases = excluded.total_purchases,
                last_purchase = excluded.last_purchase,
                outstanding_balance = excluded.outstanding_balance",
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.country)
        .bind(customer.customer_type.as_str())
        .bind(customer.total_purchases.to_string())
        .bind(customer.last_purchase)
        .bind(customer.outstanding_balance.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Header and lines are written in one transaction.
    async fn save_invoice(
        &self,
        invoice: InvoiceSummary,
    ) -> Result<StoredInvoice, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO invoices (
                invoice_number, customer_id, subtotal, tax_amount, grand_total,
                tax_rate, notes, payment_method, issued_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(invoice.invoice_number.as_str())
        .bind(invoice.customer_id)
        .bind(invoice.subtotal.to_string())
        .bind(invoice.tax_amount.to_string())
        .bind(invoice.grand_total.to_string())
        .bind(invoice.tax_rate.percent().to_string())
        .bind(&invoice.notes)
        .bind(invoice.payment_method.as_str())
        .bind(invoice.issued_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();

        for line in &invoice.line_items {
            let line_id = i64::try_from(line.line_id.get()).map_err(|_| {
                RepositoryError::Database(format!("Line id out of range: {}", line.line_id))
            })?;
            sqlx::query(
                "INSERT INTO invoice_lines (
                    invoice_id, line_id, product_id, product_name, sku,
                    quantity, unit_price, line_total
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(line_id)
            .bind(line.product.product_id)
            .bind(&line.product.name)
            .bind(&line.product.sku)
            .bind(line.quantity)
            .bind(line.unit_price.to_string())
            .bind(line.line_total.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        debug!(id, number = %invoice.invoice_number, lines = invoice.line_items.len(), "invoice stored");

        Ok(StoredInvoice {
            id,
            summary: invoice,
        })
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<StoredInvoice, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;
        let header = row_to_invoice_header(&row)?;

        self.with_lines(header).await
    }

    async fn list_invoices(&self) -> Result<Vec<StoredInvoice>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let headers = rows
            .iter()
            .map(row_to_invoice_header)
            .collect::<Result<Vec<_>, _>>()?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header in headers {
            invoices.push(self.with_lines(header).await?);
        }
        Ok(invoices)
    }

    async fn get_settings(&self) -> Result<BusinessSettings, RepositoryError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT company_name, address, phone, email, tax_id, currency, language,
                    tva_rate, low_stock_threshold, enable_notifications, enable_auto_backup
             FROM business_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => row.try_into(),
            None => Ok(BusinessSettings::default()),
        }
    }

    async fn save_settings(
        &self,
        settings: &BusinessSettings,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO business_settings (
                id, company_name, address, phone, email, tax_id, currency, language,
                tva_rate, low_stock_threshold, enable_notifications, enable_auto_backup
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                company_name = excluded.company_name,
                address = excluded.address,
                phone = excluded.phone,
                email = excluded.email,
                tax_id = excluded.tax_id,
                currency = excluded.currency,
                language = excluded.language,
                tva_rate = excluded.tva_rate,
                low_stock_threshold = excluded.low_stock_threshold,
                enable_notifications = excluded.enable_notifications,
                enable_auto_backup = excluded.enable_auto_backup",
        )
        .bind(&settings.company_name)
        .bind(&settings.address)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.tax_id)
        .bind(settings.currency.code())
        .bind(settings.language.code())
        .bind(settings.tva_rate.percent().to_string())
        .bind(settings.low_stock_threshold)
        .bind(settings.enable_notifications)
        .bind(settings.enable_auto_backup)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
