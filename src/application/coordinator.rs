//! Transfer Coordinator
//!
//! A short-lived entity that moves funds between two accounts by exchanging
//! messages with them, then reports one `TransferStatus` and stops.
//!
//! The coordinator keeps no state fields beside its current `Behavior` and its
//! configured reply timeout. Each waiting behavior carries exactly what is
//! needed to continue (destination, amount, requester, reply deadline), so the
//! data can never disagree with the state.
//!
//! A coordinator is detached: it stays reachable until it terminates, even if
//! the requester stops waiting for the outcome.
//!
//! The protocol is two-phase and NOT atomic. A deposit that fails after the
//! withdrawal succeeded is reported as `Failed` and the withdrawn funds are
//! not returned to the source account. There is no compensation step.

use crate::actor::{self, Actor, ActorHandle, Context, Flow, Inbox, Recipient};
use crate::config::BankConfig;
use crate::domain::account::AccountNumber;
use crate::domain::messages::{
    AccountCommand, AccountRef, CoordinatorMessage, TransactionStatus, Transfer, TransferStatus,
};
use crate::error::{BankError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Externally observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorState {
    AwaitingTransfer,
    AwaitingWithdrawResult,
    AwaitingDepositResult,
    Terminated,
}

impl CoordinatorState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorState::Terminated)
    }

    /// Whether the coordinator is waiting on an account reply.
    #[inline]
    pub fn is_awaiting_reply(&self) -> bool {
        matches!(
            self,
            CoordinatorState::AwaitingWithdrawResult | CoordinatorState::AwaitingDepositResult
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorState::AwaitingTransfer => "AWAITING_TRANSFER",
            CoordinatorState::AwaitingWithdrawResult => "AWAITING_WITHDRAW_RESULT",
            CoordinatorState::AwaitingDepositResult => "AWAITING_DEPOSIT_RESULT",
            CoordinatorState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The installed message handler together with the data it needs.
enum Behavior {
    AwaitingTransfer,
    AwaitingWithdrawResult {
        to: AccountRef,
        amount: Decimal,
        requester: Recipient<TransferStatus>,
        deadline: Option<Instant>,
    },
    AwaitingDepositResult {
        requester: Recipient<TransferStatus>,
        deadline: Option<Instant>,
    },
    Terminated,
}

impl Behavior {
    fn state(&self) -> CoordinatorState {
        match self {
            Behavior::AwaitingTransfer => CoordinatorState::AwaitingTransfer,
            Behavior::AwaitingWithdrawResult { .. } => CoordinatorState::AwaitingWithdrawResult,
            Behavior::AwaitingDepositResult { .. } => CoordinatorState::AwaitingDepositResult,
            Behavior::Terminated => CoordinatorState::Terminated,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        match self {
            Behavior::AwaitingWithdrawResult { deadline, .. }
            | Behavior::AwaitingDepositResult { deadline, .. } => *deadline,
            _ => None,
        }
    }
}

pub struct TransferCoordinator {
    behavior: Behavior,
    reply_timeout: Option<Duration>,
}

impl Default for TransferCoordinator {
    fn default() -> Self {
        Self::new(&BankConfig::default())
    }
}

impl TransferCoordinator {
    pub fn new(config: &BankConfig) -> Self {
        Self {
            behavior: Behavior::AwaitingTransfer,
            reply_timeout: config.reply_timeout,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.behavior.state()
    }

    fn reply_deadline(&self) -> Option<Instant> {
        self.reply_timeout.map(|limit| Instant::now() + limit)
    }

    fn receive(
        &self,
        behavior: Behavior,
        msg: CoordinatorMessage,
        ctx: &Context<CoordinatorMessage>,
    ) -> Behavior {
        match (behavior, msg) {
            (Behavior::AwaitingTransfer, CoordinatorMessage::Transfer { transfer, requester }) => {
                debug!(
                    from = transfer.from.number(),
                    to = transfer.to.number(),
                    amount = %transfer.amount,
                    "received transfer"
                );
                let Some(reply_to) = ctx.address().map(|addr| addr.recipient()) else {
                    warn!("coordinator unreachable, abandoning transfer");
                    return Behavior::Terminated;
                };
                let withdraw = AccountCommand::Withdraw {
                    amount: transfer.amount,
                    reply_to,
                };
                if transfer.from.tell(withdraw).is_err() {
                    // Dead letter: the reply will never come.
                    warn!(account = transfer.from.number(), "withdraw sent to stopped account");
                }
                Behavior::AwaitingWithdrawResult {
                    to: transfer.to,
                    amount: transfer.amount,
                    requester,
                    deadline: self.reply_deadline(),
                }
            }
            (
                Behavior::AwaitingWithdrawResult {
                    to,
                    amount,
                    requester,
                    ..
                },
                CoordinatorMessage::Status(TransactionStatus::Done),
            ) => {
                debug!("received transfer withdraw done");
                let Some(reply_to) = ctx.address().map(|addr| addr.recipient()) else {
                    warn!("coordinator unreachable after withdrawal, funds are in flight");
                    return Behavior::Terminated;
                };
                let deposit = AccountCommand::Deposit { amount, reply_to };
                if to.tell(deposit).is_err() {
                    warn!(account = to.number(), "deposit sent to stopped account");
                }
                Behavior::AwaitingDepositResult {
                    requester,
                    deadline: self.reply_deadline(),
                }
            }
            (
                Behavior::AwaitingWithdrawResult { requester, .. },
                CoordinatorMessage::Status(TransactionStatus::Failed),
            ) => {
                debug!("received transfer withdraw failed");
                report(&requester, TransferStatus::Failed);
                Behavior::Terminated
            }
            (
                Behavior::AwaitingDepositResult { requester, .. },
                CoordinatorMessage::Status(TransactionStatus::Done),
            ) => {
                debug!("received transfer deposit done");
                report(&requester, TransferStatus::Done);
                Behavior::Terminated
            }
            (
                Behavior::AwaitingDepositResult { requester, .. },
                CoordinatorMessage::Status(TransactionStatus::Failed),
            ) => {
                // Known protocol limitation: the withdrawal stays applied and
                // nothing is deposited back into the source account.
                warn!("received transfer deposit failed, withdrawn funds are not returned");
                report(&requester, TransferStatus::Failed);
                Behavior::Terminated
            }
            (behavior, msg) => {
                debug!(state = %behavior.state(), message = msg.kind(), "ignoring unexpected message");
                behavior
            }
        }
    }
}

fn report(requester: &Recipient<TransferStatus>, status: TransferStatus) {
    if requester.tell(status).is_err() {
        debug!(%status, "requester stopped before the outcome arrived");
    }
}

#[async_trait]
impl Actor for TransferCoordinator {
    type Message = CoordinatorMessage;

    async fn handle(
        &mut self,
        msg: CoordinatorMessage,
        ctx: &Context<CoordinatorMessage>,
    ) -> Flow {
        let current = std::mem::replace(&mut self.behavior, Behavior::Terminated);
        self.behavior = self.receive(current, msg, ctx);
        if self.behavior.state().is_terminal() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    fn receive_deadline(&self) -> Option<Instant> {
        self.behavior.deadline()
    }

    fn detached(&self) -> bool {
        true
    }

    async fn timed_out(&mut self, _ctx: &Context<CoordinatorMessage>) -> Flow {
        match std::mem::replace(&mut self.behavior, Behavior::Terminated) {
            Behavior::AwaitingWithdrawResult { requester, .. } => {
                warn!("timed out waiting for withdraw result");
                report(&requester, TransferStatus::Failed);
            }
            Behavior::AwaitingDepositResult { requester, .. } => {
                warn!("timed out waiting for deposit result, withdrawal may already be applied");
                report(&requester, TransferStatus::Failed);
            }
            other => {
                self.behavior = other;
                return Flow::Continue;
            }
        }
        Flow::Stop
    }
}

/// A transfer whose coordinator is running.
pub struct PendingTransfer {
    coordinator: ActorHandle<TransferCoordinator>,
    outcome: Inbox<TransferStatus>,
    from: AccountNumber,
    to: AccountNumber,
    amount: Decimal,
}

impl PendingTransfer {
    /// Waits for the single status the coordinator reports.
    ///
    /// Without a configured reply timeout this waits as long as the accounts
    /// take to answer, which is forever if one of them never does.
    pub async fn outcome(mut self) -> Result<TransferStatus> {
        let status = self.outcome.recv().await.ok_or(BankError::NoOutcome)?;
        info!(
            from = self.from,
            to = self.to,
            amount = %self.amount,
            %status,
            "transfer finished"
        );
        drop(self.coordinator);
        Ok(status)
    }
}

/// Spawns a fresh coordinator and hands it `transfer`.
pub fn start_transfer(transfer: Transfer, config: &BankConfig) -> Result<PendingTransfer> {
    let coordinator = actor::spawn(TransferCoordinator::new(config));
    let (requester, outcome) = actor::inbox::<TransferStatus>();
    let (from, to, amount) = (transfer.from.number(), transfer.to.number(), transfer.amount);

    coordinator.address().tell(CoordinatorMessage::Transfer {
        transfer,
        requester: requester.recipient(),
    })?;

    Ok(PendingTransfer {
        coordinator,
        outcome,
        from,
        to,
        amount,
    })
}
