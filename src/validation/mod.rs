//! Validation of venue data before detection

pub mod snapshot;

pub use snapshot::*;
