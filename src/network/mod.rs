//! Network helpers shared by the on-chain feed and ledger

pub mod retry;

pub use retry::*;
