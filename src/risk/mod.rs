//! Multi-factor risk scoring of opportunities

pub mod factors;
pub mod scorer;

pub use scorer::*;
