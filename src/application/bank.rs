use crate::actor::{self, ActorHandle};
use crate::application::account::AccountActor;
use crate::application::coordinator::{PendingTransfer, start_transfer};
use crate::config::BankConfig;
use crate::domain::account::{AccountNumber, Balance, BankAccount};
use crate::domain::messages::{AccountRef, Transfer, TransferStatus};
use crate::domain::ports::SharedAccountStore;
use crate::error::{BankError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::info;

/// Owns the account entities and starts a coordinator per transfer.
///
/// The bank never touches balances itself; it only addresses the account
/// entities and hands their references to coordinators.
pub struct Bank {
    store: SharedAccountStore,
    accounts: BTreeMap<AccountNumber, ActorHandle<AccountActor>>,
    config: BankConfig,
}

impl Bank {
    pub fn new(store: SharedAccountStore, config: BankConfig) -> Self {
        Self {
            store,
            accounts: BTreeMap::new(),
            config,
        }
    }

    /// Starts the entity for `number`.
    ///
    /// If the store already holds this account its stored balance wins over
    /// `opening_balance`.
    pub async fn open_account(
        &mut self,
        number: AccountNumber,
        opening_balance: Balance,
    ) -> Result<AccountRef> {
        if self.accounts.contains_key(&number) {
            return Err(BankError::DuplicateAccount(number));
        }

        let account = match self.store.get(number).await? {
            Some(existing) => {
                info!(account = number, balance = %existing.balance, "recovered account from store");
                existing
            }
            None => {
                let account = BankAccount::new(number, opening_balance);
                self.store.store(account.clone()).await?;
                account
            }
        };

        let handle = actor::spawn(AccountActor::new(account, self.store.clone()));
        let account_ref = AccountRef::new(number, handle.address());
        self.accounts.insert(number, handle);
        Ok(account_ref)
    }

    pub fn account(&self, number: AccountNumber) -> Result<AccountRef> {
        self.accounts
            .get(&number)
            .map(|handle| AccountRef::new(number, handle.address()))
            .ok_or(BankError::UnknownAccount(number))
    }

    /// Starts a transfer without waiting for its outcome.
    pub fn submit(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<PendingTransfer> {
        let transfer = Transfer::new(self.account(from)?, self.account(to)?, amount);
        start_transfer(transfer, &self.config)
    }

    pub async fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<TransferStatus> {
        self.submit(from, to, amount)?.outcome().await
    }

    /// Waits for every account entity to drain its mailbox and returns the
    /// final stored accounts ordered by number.
    ///
    /// Transfers still holding account references keep this waiting.
    pub async fn shutdown(self) -> Result<Vec<BankAccount>> {
        for handle in self.accounts.into_values() {
            handle.join().await?;
        }

        let mut accounts = self.store.get_all().await?;
        accounts.sort_by_key(|account| account.account);
        Ok(accounts)
    }
}
