use crate::domain::account::BankAccount;
use crate::error::Result;
use std::io::Write;

/// Writes final account balances as CSV (`account,balance`).
///
/// Balances are normalized, so `70.00` is written as `70`.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: Vec<BankAccount>) -> Result<()> {
        self.writer.write_record(["account", "balance"])?;
        for account in accounts {
            self.writer
                .write_record([account.account.to_string(), account.balance.to_string()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
