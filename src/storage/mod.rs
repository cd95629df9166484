//! Data persistence and file operations

pub mod journal;

pub use journal::*;
