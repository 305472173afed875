//! Minimal mailbox runtime hosting accounts and transfer coordinators.
//!
//! Every entity runs as its own `tokio` task and owns an unbounded FIFO mailbox.
//! Messages are handled strictly one at a time, so an entity's state is never
//! touched concurrently and no locks are needed around it. Sending never blocks:
//! `tell` only enqueues, and replies travel back as ordinary messages.

use crate::error::{BankError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Whether an actor keeps processing after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A serially-processing entity driven by the messages in its mailbox.
#[async_trait]
pub trait Actor: Send + Sized + 'static {
    type Message: Send + 'static;

    async fn handle(&mut self, msg: Self::Message, ctx: &Context<Self::Message>) -> Flow;

    /// Instant at which `timed_out` fires if no message arrived by then.
    ///
    /// Evaluated before every wait, so messages handled in between do not
    /// move it unless the actor changes it. `None` waits forever.
    fn receive_deadline(&self) -> Option<Instant> {
        None
    }

    /// Whether the actor holds its own mailbox open until it returns
    /// `Flow::Stop`, instead of finishing once every outside address is gone.
    fn detached(&self) -> bool {
        false
    }

    async fn timed_out(&mut self, _ctx: &Context<Self::Message>) -> Flow {
        Flow::Continue
    }
}

/// Cloneable address of a running mailbox.
pub struct Addr<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for Addr<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> fmt::Debug for Addr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addr")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<M: Send + 'static> Addr<M> {
    /// Enqueues a message. Fails once the receiving entity has stopped.
    pub fn tell(&self, msg: M) -> Result<()> {
        self.tx.send(msg).map_err(|_| BankError::MailboxClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Narrows this address to one that only accepts `T`.
    pub fn recipient<T>(&self) -> Recipient<T>
    where
        M: From<T>,
        T: Send + 'static,
    {
        let tx = self.tx.clone();
        Recipient {
            deliver: Arc::new(move |msg: T| {
                tx.send(M::from(msg)).map_err(|_| BankError::MailboxClosed)
            }),
        }
    }
}

/// Reply address that hides the concrete mailbox type behind it.
pub struct Recipient<T> {
    deliver: Arc<dyn Fn(T) -> Result<()> + Send + Sync>,
}

impl<T> Clone for Recipient<T> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
        }
    }
}

impl<T> fmt::Debug for Recipient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Recipient")
    }
}

impl<T> Recipient<T> {
    pub fn tell(&self, msg: T) -> Result<()> {
        (self.deliver)(msg)
    }
}

/// Per-actor context handed to every `handle` call.
pub struct Context<M> {
    myself: mpsc::WeakUnboundedSender<M>,
}

impl<M> Context<M> {
    /// The actor's own address, or `None` once nothing else references it.
    ///
    /// Held weakly: an actor that only knows itself is reclaimed when its
    /// mailbox drains, unless it is `detached`.
    pub fn address(&self) -> Option<Addr<M>> {
        self.myself.upgrade().map(|tx| Addr { tx })
    }
}

/// Owner's handle to a spawned actor.
pub struct ActorHandle<A: Actor> {
    addr: Addr<A::Message>,
    join: JoinHandle<A>,
}

impl<A: Actor> ActorHandle<A> {
    pub fn address(&self) -> Addr<A::Message> {
        self.addr.clone()
    }

    /// Releases this handle's address and waits for the actor to finish.
    ///
    /// The actor finishes once it returns `Flow::Stop` or every other address
    /// to it has been dropped and its mailbox is empty.
    pub async fn join(self) -> Result<A> {
        let Self { addr, join } = self;
        drop(addr);
        Ok(join.await?)
    }
}

/// Starts `actor` on its own task and returns a handle to it.
pub fn spawn<A: Actor>(actor: A) -> ActorHandle<A> {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = Context {
        myself: tx.downgrade(),
    };
    let anchor = actor.detached().then(|| tx.clone());
    let join = tokio::spawn(run(actor, rx, ctx, anchor));
    ActorHandle {
        addr: Addr { tx },
        join,
    }
}

async fn run<A: Actor>(
    mut actor: A,
    mut rx: mpsc::UnboundedReceiver<A::Message>,
    ctx: Context<A::Message>,
    anchor: Option<mpsc::UnboundedSender<A::Message>>,
) -> A {
    loop {
        let next = match actor.receive_deadline() {
            Some(deadline) => match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    if actor.timed_out(&ctx).await == Flow::Stop {
                        break;
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        let Some(msg) = next else {
            break;
        };
        if actor.handle(msg, &ctx).await == Flow::Stop {
            break;
        }
    }

    // Anything still queued, or sent from now on, is a dead letter.
    drop(anchor);
    rx.close();
    actor
}

/// Bare mailbox without an actor behind it.
///
/// Used to receive replies outside of any actor, e.g. by a transfer requester.
pub struct Inbox<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M> Inbox<M> {
    /// Waits for the next message; `None` once every address has been dropped.
    pub async fn recv(&mut self) -> Option<M> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<M> {
        self.rx.try_recv().ok()
    }
}

pub fn inbox<M>() -> (Addr<M>, Inbox<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Addr { tx }, Inbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Counter {
        seen: Vec<u32>,
    }

    #[async_trait]
    impl Actor for Counter {
        type Message = u32;

        async fn handle(&mut self, msg: u32, _ctx: &Context<u32>) -> Flow {
            self.seen.push(msg);
            if msg == 0 { Flow::Stop } else { Flow::Continue }
        }
    }

    struct Echo;

    #[async_trait]
    impl Actor for Echo {
        type Message = (String, Recipient<String>);

        async fn handle(&mut self, msg: Self::Message, _ctx: &Context<Self::Message>) -> Flow {
            let (text, reply_to) = msg;
            let _ = reply_to.tell(text);
            Flow::Continue
        }
    }

    #[derive(Debug, PartialEq)]
    enum Wrapped {
        Text(String),
    }

    impl From<String> for Wrapped {
        fn from(text: String) -> Self {
            Wrapped::Text(text)
        }
    }

    #[tokio::test]
    async fn test_messages_processed_in_send_order() {
        let handle = spawn(Counter { seen: Vec::new() });
        let addr = handle.address();
        for i in 1..=100 {
            addr.tell(i).unwrap();
        }
        drop(addr);

        let counter = handle.join().await.unwrap();
        assert_eq!(counter.seen, (1..=100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stop_closes_mailbox_and_drops_queued_messages() {
        let handle = spawn(Counter { seen: Vec::new() });
        let addr = handle.address();
        addr.tell(1).unwrap();
        addr.tell(0).unwrap();
        addr.tell(2).unwrap();

        let counter = handle.join().await.unwrap();
        assert_eq!(counter.seen, vec![1, 0]);
        assert!(addr.is_closed());
        assert!(matches!(addr.tell(3), Err(BankError::MailboxClosed)));
    }

    #[tokio::test]
    async fn test_recipient_converts_into_mailbox_type() {
        let echo = spawn(Echo);
        let (reply_addr, mut replies) = inbox::<Wrapped>();

        echo.address()
            .tell(("hello".to_string(), reply_addr.recipient()))
            .unwrap();

        assert_eq!(
            replies.recv().await,
            Some(Wrapped::Text("hello".to_string()))
        );
    }

    #[tokio::test]
    async fn test_inbox_closes_when_all_addresses_dropped() {
        let (addr, mut inbox) = inbox::<u8>();
        let recipient = addr.recipient::<u8>();
        drop(addr);
        recipient.tell(7).unwrap();
        drop(recipient);

        assert_eq!(inbox.recv().await, Some(7));
        assert_eq!(inbox.recv().await, None);
    }

    struct Sleeper {
        deadline: Instant,
        handled: u32,
        handled_before_first_timeout: Option<u32>,
        timeouts: u32,
    }

    impl Sleeper {
        fn new() -> Self {
            Self {
                deadline: Instant::now() + Duration::from_millis(50),
                handled: 0,
                handled_before_first_timeout: None,
                timeouts: 0,
            }
        }
    }

    #[async_trait]
    impl Actor for Sleeper {
        type Message = ();

        async fn handle(&mut self, _msg: (), _ctx: &Context<()>) -> Flow {
            self.handled += 1;
            Flow::Continue
        }

        fn receive_deadline(&self) -> Option<Instant> {
            Some(self.deadline)
        }

        async fn timed_out(&mut self, _ctx: &Context<()>) -> Flow {
            self.handled_before_first_timeout.get_or_insert(self.handled);
            self.timeouts += 1;
            self.deadline = Instant::now() + Duration::from_millis(50);
            if self.timeouts == 3 { Flow::Stop } else { Flow::Continue }
        }
    }

    #[tokio::test]
    async fn test_receive_deadline_fires_until_stopped() {
        let handle = spawn(Sleeper::new());
        let _keep_alive = handle.address();
        let sleeper = handle.join().await.unwrap();
        assert_eq!(sleeper.timeouts, 3);
    }

    #[tokio::test]
    async fn test_messages_do_not_postpone_deadline() {
        let handle = spawn(Sleeper::new());
        let addr = handle.address();
        // Keep the mailbox busy well past the first deadline.
        for _ in 0..20 {
            addr.tell(()).unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let sleeper = handle.join().await.unwrap();
        assert_eq!(sleeper.timeouts, 3);
        assert_eq!(sleeper.handled, 20);
        assert!(sleeper.handled_before_first_timeout.unwrap() < 20);
    }

    struct Lonely {
        seen: Vec<u8>,
    }

    #[async_trait]
    impl Actor for Lonely {
        type Message = u8;

        async fn handle(&mut self, msg: u8, ctx: &Context<u8>) -> Flow {
            self.seen.push(msg);
            match msg {
                0 => Flow::Stop,
                n => {
                    if let Some(me) = ctx.address() {
                        me.tell(n - 1).unwrap();
                    }
                    Flow::Continue
                }
            }
        }

        fn detached(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_detached_actor_outlives_dropped_addresses() {
        let handle = spawn(Lonely { seen: Vec::new() });
        handle.address().tell(3).unwrap();

        let lonely = tokio::time::timeout(Duration::from_secs(5), handle.join())
            .await
            .expect("detached actor must stop on its own")
            .unwrap();
        assert_eq!(lonely.seen, vec![3, 2, 1, 0]);
    }
}
