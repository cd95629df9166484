//! Opportunity detection across venue pairs

pub mod detector;

pub use detector::*;
