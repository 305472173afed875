use crate::domain::account::{AccountNumber, BankAccount};
use crate::domain::ports::AccountStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for account state.
///
/// Uses `Arc<RwLock<HashMap<AccountNumber, BankAccount>>>` so every account
/// entity can share one store. Nothing survives the process.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountNumber, BankAccount>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: BankAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.account, account);
        Ok(())
    }

    async fn get(&self, account: AccountNumber) -> Result<Option<BankAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account).cloned())
    }

    async fn get_all(&self) -> Result<Vec<BankAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}
