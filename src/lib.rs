//! Life Search - Evolutionary search for long-lived Game of Life seeds.
//!
//! Random seed boards are run under the B3/S23 rule until they die out, repeat a state,
//! or exhaust a tick budget. The futures of states seen ahead of a termination are
//! shared between trials through a concurrent survival cache, so later trials that
//! reach a known state stop early with the same result. An evolutionary mode keeps the boards that outlive half the budget and
//! refills the population with mutated copies of them.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, validation and run statistics
//! - `compute`: Boards, the step function, the survival cache and the search engine
//!
//! # Example
//!
//! ```rust,no_run
//! use life_search::{
//!     compute::evolution::{SearchEngine, top_trials},
//!     schema::SearchConfig,
//! };
//!
//! let config = SearchConfig {
//!     board_size: 6,
//!     trial_count: 1000,
//!     ..SearchConfig::default()
//! };
//!
//! let mut engine = SearchEngine::new(config).unwrap();
//! let trials = engine.run().unwrap();
//!
//! for (board, ticks) in top_trials(&trials, 3) {
//!     println!("{board}{ticks}");
//! }
//! println!("Cache hit rate: {:.1}%", engine.cache().stats().hit_rate() * 100.0);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{Evaluation, FitnessEvaluator, SearchEngine, SearchError, Trial};
pub use compute::{BoardState, Cell, DenseBoard, SurvivalCache};
pub use schema::{EvolutionConfig, SearchConfig};
