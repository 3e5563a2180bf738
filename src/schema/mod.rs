//! Schema module - Configuration and run-report types for maze simulations.

mod config;
mod report;

pub use config::*;
pub use report::*;
