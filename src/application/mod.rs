//! Application layer: the account and coordinator entities and the `Bank`
//! that wires them together.
//!
//! Accounts and coordinators never call each other. They run as independent
//! actors on `tokio` and only exchange messages, so each account applies its
//! operations strictly one at a time without locks.

pub mod account;
pub mod bank;
pub mod coordinator;
