//! Compute module - Board representation, the Life rule and survival search.

mod board;
mod cache;
mod step;

pub mod evolution;

pub use board::*;
pub use cache::*;
pub use step::*;
