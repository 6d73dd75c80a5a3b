use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use sales_cli::app::{self, InvoiceRequest};
use sales_cli::config::AppConfig;
use sales_cli::logging::{enable_file_logging, init_logging};
use sales_cli::utils::{ItemArg, parse_item, parse_payment_method, parse_tax_rate};
use sales_core::queries::{CustomerFilter, CustomerSegment, ProductFilter};
use sales_core::{PaymentMethod, TaxRate};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Invoicing for a small shop: browse the catalog and customer directory,
/// build invoices and review sales.
#[derive(Debug, Parser)]
#[command(name = "sales", version)]
struct Cli {
    /// Configuration file. Defaults to `sales.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (`memory` or `sqlite`), overriding the config file.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Connection string for the backend.
    /// For SQLite this is a file path (e.g. `sales.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or `EnvFilter` directive. `RUST_LOG` still wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the product catalog.
    Products {
        /// Match against name or SKU.
        #[arg(long, default_value = "")]
        query: String,

        #[arg(long)]
        category: Option<String>,

        /// Only products at or below their low-stock threshold.
        #[arg(long)]
        low_stock: bool,
    },

    /// List customers.
    Customers {
        /// Match against name, email or phone.
        #[arg(long, default_value = "")]
        query: String,

        /// all, individual, business or outstanding.
        #[arg(long, default_value = "all", value_parser = app::parse_segment)]
        segment: CustomerSegment,
    },

    /// Build an invoice and save it.
    Invoice {
        #[arg(long)]
        customer: i64,

        /// `PRODUCT_ID[:QTY]`, repeatable. Repeating a product adds a second line.
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<ItemArg>,

        /// TVA percentage. Defaults to the business rate.
        #[arg(long, value_parser = parse_tax_rate)]
        tax_rate: Option<TaxRate>,

        #[arg(long, default_value = "cash", value_parser = parse_payment_method)]
        payment: PaymentMethod,

        #[arg(long)]
        notes: Option<String>,

        /// Print the invoice as JSON.
        #[arg(long)]
        json: bool,

        /// Compute and print without saving.
        #[arg(long)]
        dry_run: bool,
    },

    /// List saved invoices with a sales summary.
    Invoices {
        /// Show one invoice in full.
        #[arg(long)]
        id: Option<i64>,
    },

    /// Show the business settings.
    Settings,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.backend, cli.db, cli.log_level);

    init_logging(&config.logging.level);
    if let Some(path) = &config.logging.file {
        enable_file_logging(path)?;
    }
    debug!(backend = %config.database.backend, "configuration loaded");

    let repo = app::open_repository(&config).await?;

    let output = match cli.command {
        Command::Products {
            query,
            category,
            low_stock,
        } => {
            let filter = ProductFilter { query, category };
            app::products(repo.as_ref(), &filter, low_stock).await?
        }
        Command::Customers { query, segment } => {
            let filter = CustomerFilter { query, segment };
            app::customers(repo.as_ref(), &filter).await?
        }
        Command::Invoice {
            customer,
            items,
            tax_rate,
            payment,
            notes,
            json,
            dry_run,
        } => {
            let request = InvoiceRequest {
                customer_id: customer,
                items,
                tax_rate,
                payment_method: payment,
                notes,
                dry_run,
            };
            let outcome = app::create_invoice(repo, &request)
                .await
                .context("invoice not created")?;
            if json {
                format!("{}\n", outcome.to_json()?)
            } else {
                outcome.to_text()
            }
        }
        Command::Invoices { id } => app::invoices(repo.as_ref(), id).await?,
        Command::Settings => app::settings(repo.as_ref()).await?,
    };

    print!("{output}");
    Ok(())
}
