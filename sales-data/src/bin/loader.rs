use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sales_data::CatalogLoader;
use sales_db_sqlite::SqliteRepository;

/// Load a product catalog from a CSV file into a SQLite database.
///
/// The CSV file should have the following columns:
/// - id, name, sku, category
/// - quantity: units on hand
/// - price, cost: decimal amounts, not negative
/// - low_stock_threshold: optional, defaults to 10
/// - last_updated: YYYY-MM-DD
#[derive(Parser, Debug)]
#[command(name = "sales-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the catalog
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL; a bare path is created if missing
    #[arg(short, long, default_value = "sales.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading catalog from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = CatalogLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let written = CatalogLoader::load(&repo, &records)
        .await
        .context("Failed to load catalog into database")?;

    println!("Successfully loaded {} products into the database.", written);

    Ok(())
}
