use clap::{Parser, ValueEnum};
use milkshakr_purchase::application::flow::{FlowServices, PurchaseFlowController};
use milkshakr_purchase::domain::merchant::MerchantConfig;
use milkshakr_purchase::domain::ports::{AccountStoreBox, PaymentProviderBox};
use milkshakr_purchase::domain::session::{PaymentToken, SessionEvent, SessionOutcome};
use milkshakr_purchase::infrastructure::console::{
    ConsolePresenter, LoggingDelegate, LoggingNotificationScheduler, LoggingShortcutRegistry,
};
use milkshakr_purchase::infrastructure::in_memory::InMemoryAccountStore;
use milkshakr_purchase::infrastructure::scripted::ScriptedPaymentProvider;
use milkshakr_purchase::interfaces::csv::product_reader::ProductReader;
use milkshakr_purchase::interfaces::csv::purchase_writer::PurchaseWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum Outcome {
    Success,
    Failure,
    Cancelled,
}

impl From<Outcome> for SessionOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => SessionOutcome::Success,
            Outcome::Failure => SessionOutcome::Failure,
            Outcome::Cancelled => SessionOutcome::Cancelled,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Products CSV file (identifier, name, price)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// How the simulated payment sheet finishes
    #[arg(long, value_enum, default_value_t = Outcome::Success)]
    outcome: Outcome,

    /// Finish the payment sheet without authorizing a payment first
    #[arg(long)]
    no_authorize: bool,

    /// Simulate a device without a payment provider
    #[arg(long)]
    unavailable: bool,

    /// JSON file overriding the merchant shown on the payment sheet
    #[arg(long)]
    merchant_config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn in_memory_store() -> (AccountStoreBox, AccountStoreBox) {
    let store = InMemoryAccountStore::new();
    (Box::new(store.clone()), Box::new(store))
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<(AccountStoreBox, AccountStoreBox)> {
    use milkshakr_purchase::infrastructure::rocksdb::RocksDBAccountStore;

    match db_path {
        Some(db_path) => {
            let store = RocksDBAccountStore::open(db_path).into_diagnostic()?;
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_store()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<(AccountStoreBox, AccountStoreBox)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_store())
}

fn transaction_identifier() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("txn-{nanos}")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let merchant = match &cli.merchant_config {
        Some(path) => MerchantConfig::load(path).into_diagnostic()?,
        None => MerchantConfig::default(),
    };

    let file = File::open(&cli.input).into_diagnostic()?;
    let mut products = Vec::new();
    for product in ProductReader::new(file).products() {
        match product {
            Ok(product) => products.push(product),
            Err(e) => eprintln!("Error reading product: {}", e),
        }
    }

    let provider: PaymentProviderBox = if cli.unavailable {
        Box::new(ScriptedPaymentProvider::unavailable())
    } else {
        let mut events = Vec::new();
        if !cli.no_authorize {
            events.push(SessionEvent::Authorized(PaymentToken::new(
                transaction_identifier(),
            )));
        }
        events.push(SessionEvent::Finished(cli.outcome.into()));
        Box::new(ScriptedPaymentProvider::new(events))
    };

    // One handle goes to the flow, the other reads the purchases back.
    let (flow_store, report_store) = open_store(cli.db_path)?;

    let mut controller = PurchaseFlowController::new(
        Arc::new(ConsolePresenter),
        products,
        flow_store,
        FlowServices {
            provider,
            notifications: Arc::new(LoggingNotificationScheduler),
            shortcuts: Arc::new(LoggingShortcutRegistry),
        },
    )
    .into_diagnostic()?
    .with_merchant(merchant)
    .with_delegate(Arc::new(LoggingDelegate));

    let state = controller.start().await.into_diagnostic()?;
    tracing::info!(?state, "Purchase flow finished");
    controller.take_fan_out().join().await;

    let purchases = report_store.purchases().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = PurchaseWriter::new(stdout.lock());
    writer.write_purchases(&purchases).into_diagnostic()?;

    Ok(())
}
