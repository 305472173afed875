use crate::domain::account::AccountNumber;
use crate::error::{BankError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

/// One row of the opening balances file: `account, balance`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OpeningBalance {
    pub account: AccountNumber,
    pub balance: Decimal,
}

/// One row of the transfers file: `from, to, amount`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TransferRecord {
    pub from: AccountNumber,
    pub to: AccountNumber,
    pub amount: Decimal,
}

/// Reads typed records from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting ragged rows. Each
/// row is deserialized lazily, so a malformed row yields an `Err` item without
/// stopping the rows after it.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecordReader<R> {
    /// Creates a new `RecordReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BankError::from))
    }

    pub fn transfers(self) -> impl Iterator<Item = Result<TransferRecord>> {
        self.records()
    }

    pub fn opening_balances(self) -> impl Iterator<Item = Result<OpeningBalance>> {
        self.records()
    }
}
