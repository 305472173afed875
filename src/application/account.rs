use crate::actor::{Actor, Context, Flow, Recipient};
use crate::domain::account::{AccountNumber, BankAccount};
use crate::domain::messages::{AccountCommand, TransactionStatus};
use crate::domain::ports::SharedAccountStore;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, error};

/// Account entity: the single point of mutation for one balance.
///
/// Commands are applied one at a time in mailbox order. A new state is written
/// to the store before `Done` is answered; if the write fails the command is
/// answered `Failed` and the balance stays as it was.
pub struct AccountActor {
    account: BankAccount,
    store: SharedAccountStore,
}

impl AccountActor {
    pub fn new(account: BankAccount, store: SharedAccountStore) -> Self {
        Self { account, store }
    }

    pub fn number(&self) -> AccountNumber {
        self.account.account
    }

    pub fn into_account(self) -> BankAccount {
        self.account
    }

    async fn apply<F>(&mut self, op: &'static str, amount: Decimal, f: F) -> TransactionStatus
    where
        F: FnOnce(&mut BankAccount) -> Result<()>,
    {
        let mut next = self.account.clone();
        if let Err(e) = f(&mut next) {
            debug!(account = self.number(), op, %amount, reason = %e, "rejected");
            return TransactionStatus::Failed;
        }

        match self.store.store(next.clone()).await {
            Ok(()) => {
                debug!(account = self.number(), op, %amount, balance = %next.balance, "applied");
                self.account = next;
                TransactionStatus::Done
            }
            Err(e) => {
                error!(account = self.number(), op, %amount, error = %e, "failed to persist account");
                TransactionStatus::Failed
            }
        }
    }

    fn reply(&self, reply_to: Recipient<TransactionStatus>, status: TransactionStatus) {
        // The requester may already be gone; the operation stays applied.
        if reply_to.tell(status).is_err() {
            debug!(account = self.number(), ?status, "reply dropped, requester stopped");
        }
    }
}

#[async_trait]
impl Actor for AccountActor {
    type Message = AccountCommand;

    async fn handle(&mut self, cmd: AccountCommand, _ctx: &Context<AccountCommand>) -> Flow {
        match cmd {
            AccountCommand::Withdraw { amount, reply_to } => {
                let status = self
                    .apply("withdraw", amount, |acc| acc.withdraw(amount))
                    .await;
                self.reply(reply_to, status);
            }
            AccountCommand::Deposit { amount, reply_to } => {
                let status = self
                    .apply("deposit", amount, |acc| acc.deposit(amount))
                    .await;
                self.reply(reply_to, status);
            }
        }
        Flow::Continue
    }
}
