//! Long-lived guardian loop and the state it owns

pub mod history;
pub mod runner;
pub mod state;

pub use history::*;
pub use runner::*;
pub use state::*;
