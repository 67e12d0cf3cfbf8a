use clap::Parser;
use miette::{IntoDiagnostic, Result};
use openpay_sync::application::sync::SyncService;
use openpay_sync::domain::ports::{GatewayBox, RecordStoreBox};
use openpay_sync::infrastructure::in_memory::InMemoryStore;
use openpay_sync::infrastructure::mock_gateway::MockGateway;
use openpay_sync::interfaces::csv::customer_reader::CustomerReader;
use openpay_sync::interfaces::csv::report_writer::ReportWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Synchronizes a CSV of customers against the payment gateway and prints a
/// report with the assigned remote identifiers. Without gateway flags the
/// deterministic mock gateway is used, which makes for a safe dry run.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input customers CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Gateway API base URL, e.g. https://sandbox-api.openpay.mx
    #[cfg(feature = "gateway-http")]
    #[arg(long, requires = "merchant_id", requires = "api_key")]
    base_url: Option<String>,

    /// Gateway merchant identifier
    #[cfg(feature = "gateway-http")]
    #[arg(long)]
    merchant_id: Option<String>,

    /// Gateway private API key
    #[cfg(feature = "gateway-http")]
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store: RecordStoreBox = {
        #[cfg(feature = "storage-rocksdb")]
        {
            match &cli.db_path {
                Some(db_path) => {
                    let store = openpay_sync::infrastructure::rocksdb::RocksDbStore::open(db_path)
                        .into_diagnostic()?;
                    Box::new(store) as RecordStoreBox
                }
                None => Box::new(InMemoryStore::new()) as RecordStoreBox,
            }
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            Box::new(InMemoryStore::new())
        }
    };

    let gateway: GatewayBox = {
        #[cfg(feature = "gateway-http")]
        {
            use openpay_sync::infrastructure::http::{HttpGateway, HttpGatewayConfig};
            match (&cli.base_url, &cli.merchant_id, &cli.api_key) {
                (Some(base_url), Some(merchant_id), Some(api_key)) => {
                    Box::new(HttpGateway::new(HttpGatewayConfig {
                        base_url: base_url.clone(),
                        merchant_id: merchant_id.clone(),
                        api_key: api_key.clone(),
                    })) as GatewayBox
                }
                _ => Box::new(MockGateway::new()) as GatewayBox,
            }
        }
        #[cfg(not(feature = "gateway-http"))]
        {
            Box::new(MockGateway::new())
        }
    };

    let service = SyncService::new(store, gateway);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CustomerReader::new(file);
    let mut synced = Vec::new();
    for customer in reader.customers() {
        match customer {
            Ok(customer) => match service.save_customer(customer).await {
                Ok(saved) => synced.push(saved),
                Err(e) => eprintln!("Error synchronizing customer: {e}"),
            },
            Err(e) => eprintln!("Error reading customer: {e}"),
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_customers(&synced).into_diagnostic()?;

    Ok(())
}
