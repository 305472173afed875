use crate::error::BankError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AccountNumber = u32;

/// A signed monetary value held by an account.
///
/// Wraps `rust_decimal::Decimal` so balances never go through floating point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, amount: Decimal) -> Option<Self> {
        self.0.checked_add(amount).map(Self)
    }

    pub fn checked_sub(self, amount: Decimal) -> Option<Self> {
        self.0.checked_sub(amount).map(Self)
    }
}

impl From<Decimal> for Balance {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// The state owned by one account entity.
///
/// Only the account's own message loop calls `withdraw` and `deposit`, one
/// operation at a time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BankAccount {
    /// Immutable account identifier.
    pub account: AccountNumber,
    pub balance: Balance,
}

impl BankAccount {
    pub fn new(account: AccountNumber, balance: Balance) -> Self {
        Self { account, balance }
    }

    /// Withdraws `amount` if it does not exceed the balance.
    ///
    /// Negative amounts are not rejected and end up increasing the balance.
    /// Callers are expected to send non-negative amounts.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), BankError> {
        if amount > self.balance.0 {
            return Err(BankError::InsufficientFunds {
                balance: self.balance.0,
                requested: amount,
            });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(BankError::Overflow(self.account))?;
        Ok(())
    }

    /// Deposits `amount`; negative amounts are rejected.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), BankError> {
        if amount < Decimal::ZERO {
            return Err(BankError::NegativeDeposit(amount));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(BankError::Overflow(self.account))?;
        Ok(())
    }
}
