//! Schema module - Configuration and result types for survival search.

mod config;
mod search;

pub use config::*;
pub use search::*;
