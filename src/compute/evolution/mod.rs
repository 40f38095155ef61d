//! Evolutionary search for long-lived Game of Life seeds.
//!
//! # Overview
//!
//! - **Fitness** (`fitness`): runs a board until it dies, cycles, hits the survival
//!   cache or exhausts the tick budget
//! - **Mutation** (`mutator`): random seed boards and exact-count cell flips
//! - **Search** (`search`): batch search, the evolutionary step and the generation loop
//! - **Ranking** (`ranking`): ordering and reporting of evaluated trials
//!
//! # Example
//!
//! ```rust,no_run
//! use life_search::schema::SearchConfig;
//! use life_search::compute::evolution::{SearchEngine, render_report, top_trials};
//!
//! let mut engine = SearchEngine::new(SearchConfig::default()).unwrap();
//! let trials = engine.run().unwrap();
//! print!("{}", render_report(&top_trials(&trials, 10)));
//!
//! let result = engine
//!     .run_evolution_with_callback(|generation| {
//!         println!(
//!             "Generation {}: {} survivors, best tick {}",
//!             generation.generation, generation.survivors, generation.best_tick
//!         );
//!     })
//!     .unwrap();
//! println!("Stopped: {:?}", result.stats.stop_reason);
//! ```
//!
//! # Selection
//!
//! A board survives a generation if it lasts past half the tick budget. Survivors
//! refill the population in proportion to the live cells they accumulated, each
//! getting at least one mutated child. Survivors themselves are not carried over.

mod fitness;
mod mutator;
mod ranking;
mod search;

pub use fitness::{Evaluation, FitnessEvaluator, Termination};
pub use mutator::{BoardRng, RANDOM_BOARD_FRACTION, flip_count};
pub use ranking::{TrialSummary, rank_trials, render_report, summarize, top_trials};
pub use search::{
    EvolutionResult, Generation, SearchEngine, SearchError, Trial, grow_survivor,
    reproduction_counts,
};
