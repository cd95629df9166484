//! Trade execution: simulated and live backends

pub mod engine;
pub mod ledger;
pub mod simulation;

pub use engine::*;
pub use ledger::{AlloyLedger, Ledger, LedgerReceipt};
pub use simulation::*;
