//! Turning a risk score into EXECUTE / WAIT / SKIP

pub mod engine;

pub use engine::*;
