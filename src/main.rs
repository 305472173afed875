use bank_transfer::application::bank::Bank;
use bank_transfer::config::{BankConfig, LogConfig};
use bank_transfer::domain::account::Balance;
use bank_transfer::domain::ports::SharedAccountStore;
use bank_transfer::infrastructure::in_memory::InMemoryAccountStore;
use bank_transfer::interfaces::csv::account_writer::AccountWriter;
use bank_transfer::interfaces::csv::record_reader::RecordReader;
use bank_transfer::logging::init_logging;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transfers CSV file (`from, to, amount`)
    transfers: PathBuf,

    /// Opening balances CSV file (`account, balance`)
    #[arg(long)]
    accounts: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Wait for each transfer to finish before starting the next one
    #[arg(long)]
    sequential: bool,

    /// Fail a transfer when an account does not answer within this many milliseconds
    #[arg(long, value_name = "MS")]
    reply_timeout_ms: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<SharedAccountStore> {
    use bank_transfer::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Arc::new(InMemoryAccountStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<SharedAccountStore> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryAccountStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    let mut config = BankConfig::default();
    if let Some(ms) = cli.reply_timeout_ms {
        config = config.with_reply_timeout(Duration::from_millis(ms));
    }

    let store = open_store(cli.db_path)?;
    let mut bank = Bank::new(store, config);

    // Open accounts
    let file = File::open(&cli.accounts).into_diagnostic()?;
    for row in RecordReader::new(file).opening_balances() {
        match row {
            Ok(opening) => {
                if let Err(e) = bank
                    .open_account(opening.account, Balance::new(opening.balance))
                    .await
                {
                    eprintln!("Error opening account: {}", e);
                }
            }
            Err(e) => eprintln!("Error reading account: {}", e),
        }
    }

    // Run transfers, each on its own coordinator
    let file = File::open(&cli.transfers).into_diagnostic()?;
    let mut pending = Vec::new();
    for row in RecordReader::new(file).transfers() {
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Error reading transfer: {}", e);
                continue;
            }
        };

        match bank.submit(record.from, record.to, record.amount) {
            Ok(transfer) if cli.sequential => {
                if let Err(e) = transfer.outcome().await {
                    eprintln!("Error processing transfer: {}", e);
                }
            }
            Ok(transfer) => pending.push(transfer),
            Err(e) => eprintln!("Error processing transfer: {}", e),
        }
    }

    for transfer in pending {
        if let Err(e) = transfer.outcome().await {
            eprintln!("Error processing transfer: {}", e);
        }
    }

    let accounts = bank.shutdown().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
