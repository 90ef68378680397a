//! API models

pub mod report;

pub use report::*;
