//! Domain types: account state, the message protocol and storage ports.

pub mod account;
pub mod messages;
pub mod ports;
