use super::account::{AccountNumber, BankAccount};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Write-through sink for account state.
///
/// Each record is written only by the account entity that owns it.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: BankAccount) -> Result<()>;
    async fn get(&self, account: AccountNumber) -> Result<Option<BankAccount>>;
    async fn get_all(&self) -> Result<Vec<BankAccount>>;
}

pub type SharedAccountStore = Arc<dyn AccountStore>;
