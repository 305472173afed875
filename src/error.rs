use crate::domain::account::AccountNumber;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },
    #[error("Cannot deposit a negative amount: {0}")]
    NegativeDeposit(Decimal),
    #[error("Balance of account {0} would overflow")]
    Overflow(AccountNumber),
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountNumber),
    #[error("Account {0} is already open")]
    DuplicateAccount(AccountNumber),
    #[error("Mailbox closed")]
    MailboxClosed,
    #[error("Transfer ended without reporting an outcome")]
    NoOutcome,
    #[error("Actor task failed: {0}")]
    ActorFailed(#[from] tokio::task::JoinError),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, BankError>;
