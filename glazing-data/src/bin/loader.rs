use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glazing_data::PriceTableLoader;
use glazing_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Load unit prices from a CSV file into the lead store.
///
/// The CSV file must have a header row and these columns:
/// - service: windows or doors
/// - material: aluminium, upvc or composite
/// - unit_price: whole pounds per unit
#[derive(Parser, Debug)]
#[command(name = "glazing-price-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing unit prices
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:glazing.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:glazing.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Validate and print the prices without touching the database
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let records = PriceTableLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} prices from {}", records.len(), args.file.display());

    if args.dry_run {
        println!("Resulting table over built-in prices:");
        for row in PriceTableLoader::to_table(&records).rows() {
            println!(
                "  {:<8} {:<10} {}",
                row.service.as_str(),
                row.material.as_str(),
                row.unit_price
            );
        }
        println!("Dry run; nothing stored.");
        return Ok(());
    }

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

    let stored = PriceTableLoader::load(&repo, &records)
        .await
        .context("Failed to store unit prices")?;

    println!("Stored {} unit prices from {}.", stored, args.file.display());

    Ok(())
}
