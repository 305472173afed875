//! Messages exchanged between requesters, coordinators and accounts.

use crate::actor::{Addr, Recipient};
use crate::domain::account::AccountNumber;
use crate::error::Result;
use rust_decimal::Decimal;
use std::fmt;

/// Outcome of a single `Withdraw` or `Deposit`, sent by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Done,
    Failed,
}

/// Final outcome of a transfer, sent by a coordinator to its requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Done,
    Failed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Done => f.write_str("DONE"),
            TransferStatus::Failed => f.write_str("FAILED"),
        }
    }
}

/// Requests an account answers with exactly one `TransactionStatus`.
#[derive(Debug)]
pub enum AccountCommand {
    Withdraw {
        amount: Decimal,
        reply_to: Recipient<TransactionStatus>,
    },
    Deposit {
        amount: Decimal,
        reply_to: Recipient<TransactionStatus>,
    },
}

/// Address of an account entity, tagged with its number for diagnostics.
#[derive(Debug, Clone)]
pub struct AccountRef {
    number: AccountNumber,
    addr: Addr<AccountCommand>,
}

impl AccountRef {
    pub fn new(number: AccountNumber, addr: Addr<AccountCommand>) -> Self {
        Self { number, addr }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn tell(&self, command: AccountCommand) -> Result<()> {
        self.addr.tell(command)
    }
}

/// Request to move `amount` from one account to another.
///
/// The amount is carried as-is; accounts decide whether it is acceptable.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub from: AccountRef,
    pub to: AccountRef,
    pub amount: Decimal,
}

impl Transfer {
    pub fn new(from: AccountRef, to: AccountRef, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}

/// Everything a coordinator's mailbox accepts.
#[derive(Debug)]
pub enum CoordinatorMessage {
    Transfer {
        transfer: Transfer,
        requester: Recipient<TransferStatus>,
    },
    Status(TransactionStatus),
}

impl From<TransactionStatus> for CoordinatorMessage {
    fn from(status: TransactionStatus) -> Self {
        CoordinatorMessage::Status(status)
    }
}

impl CoordinatorMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorMessage::Transfer { .. } => "transfer",
            CoordinatorMessage::Status(TransactionStatus::Done) => "status_done",
            CoordinatorMessage::Status(TransactionStatus::Failed) => "status_failed",
        }
    }
}
