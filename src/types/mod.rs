//! Core data types and structures

pub mod venue;
pub mod opportunity;
pub mod risk;
pub mod decision;
pub mod execution;
pub mod dashboard;

pub use venue::*;
pub use opportunity::*;
pub use risk::*;
pub use decision::*;
pub use execution::*;
pub use dashboard::*;
