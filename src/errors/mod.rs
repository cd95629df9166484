//! Error handling and recovery mechanisms

pub mod guardian_error;
pub mod recovery;

pub use guardian_error::*;
pub use recovery::*;
