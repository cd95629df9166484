//! Peg Guardian - divergence monitoring and execution loop for pegged-asset pools
//!
//! Each cycle pulls venue snapshots, flags pairwise price divergences, scores
//! them on six risk factors, decides EXECUTE / WAIT / SKIP for the best one and
//! executes it (simulated or on-chain) when the decision says so.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod feed;
pub mod validation;
pub mod arbitrage;
pub mod risk;
pub mod decision;
pub mod advisory;
pub mod execution;
pub mod storage;
pub mod agent;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{GuardianError, GuardianResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
