use clap::Parser;
use miette::{IntoDiagnostic, Result};
use orderdesk::application::engine::OrderEngine;
use orderdesk::domain::ports::DatastoreBox;
use orderdesk::infrastructure::in_memory::InMemoryStore;
#[cfg(feature = "storage-rocksdb")]
use orderdesk::infrastructure::rocksdb::RocksDbStore;
use orderdesk::interfaces::csv::catalog_reader::CatalogReader;
use orderdesk::interfaces::csv::op_reader::OperationReader;
use orderdesk::interfaces::csv::report_writer::ReportWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    ops: PathBuf,

    /// Catalog seed CSV; products get ids 1..n in row order
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // Spans go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let store: DatastoreBox = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Box::new(RocksDbStore::open(db_path).into_diagnostic()?),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Box::new(InMemoryStore::new())
        }
        None => Box::new(InMemoryStore::new()),
    };
    let engine = OrderEngine::new(store);

    // Seed the catalog
    if let Some(catalog) = cli.catalog {
        let file = File::open(catalog).into_diagnostic()?;
        for product in CatalogReader::new(file).products() {
            match product {
                Ok(product) => {
                    if let Err(e) = engine.create_product(product).await {
                        eprintln!("Error seeding product: {}", e);
                    }
                }
                Err(e) => {
                    eprintln!("Error reading product: {}", e);
                }
            }
        }
    }

    // Process operations
    let file = File::open(cli.ops).into_diagnostic()?;
    let today = chrono::Local::now().date_naive();
    for op_result in OperationReader::new(file).operations() {
        match op_result {
            Ok(op) => {
                if let Err(e) = op.apply(&engine, today).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Output final state
    let orders = engine.orders().await.into_diagnostic()?;
    let products = engine.catalog().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer
        .write_report(&orders, &products)
        .into_diagnostic()?;

    Ok(())
}
