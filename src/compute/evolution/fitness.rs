//! Survival-time fitness evaluation.
//!
//! A board's fitness is the tick at which it terminates: it dies out, revisits a state
//! it has already been in, reaches a state whose future is already cached, or outlasts
//! the tick budget. A cached evaluation reports the same tick and totals as an uncached
//! one; only `ticks_simulated` and the `CacheHit` cause differ.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compute::{BoardState, Remaining, SurvivalCache, step};
use crate::schema::{SearchConfig, Window};

/// Why an evaluation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// No live cells remain.
    Extinct,
    /// The state repeated an earlier state of the same run.
    Cycle,
    /// The state's remaining lifetime was found in the survival cache.
    CacheHit,
    /// Still alive when the tick budget ran out.
    Survived,
}

/// Result of evaluating one seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Tick at which the board terminated (at most the budget).
    pub termination_tick: u64,
    /// How it terminated.
    pub termination: Termination,
    /// Sum of live cells over the seed and every tick up to termination.
    pub total_live_cells: u64,
    /// Cells alive in a tick that were dead in the tick before.
    pub cells_created: u64,
    /// Live cells in the terminating state.
    pub final_live_cells: u64,
    /// Ticks actually simulated.
    pub ticks_simulated: u64,
}

/// Tick loop state.
#[derive(Clone, Copy)]
enum RunState {
    Running,
    Extinct { tick: u64 },
    /// `first` is the tick the repeated state was produced at.
    Cycle { tick: u64, first: u64 },
    CacheHit { tick: u64, rest: Remaining },
}

/// Runs boards forward and measures how long they last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitnessEvaluator {
    max_ticks: u64,
    window: Option<Window>,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(max_ticks: u64, window: Option<Window>) -> Self {
        Self { max_ticks, window }
    }

    /// Evaluator using a config's tick budget and window.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.max_ticks, config.window())
    }

    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Evaluate a seed.
    ///
    /// Tick 0 is the first applied step; the seed itself only contributes to
    /// `total_live_cells`. When a cache is given it is consulted every tick. A cached
    /// future is only taken if it ends inside the budget; once one runs past it, the
    /// rest of the run is simulated without lookups. After a run that terminated inside
    /// the budget, every visited state ahead of the detected cycle is offered to the
    /// cache.
    pub fn evaluate(&self, seed: &BoardState, cache: Option<&SurvivalCache>) -> Evaluation {
        // State -> tick it was produced at.
        let mut visited: HashMap<BoardState, u64> = HashMap::new();
        // Running (live cells, births) totals after each tick, seed excluded.
        let mut totals: Vec<(u64, u64)> = Vec::new();
        let mut current = seed.clone();
        let mut live_cells = 0u64;
        let mut births = 0u64;
        let mut consult_cache = cache.is_some();
        let mut run = RunState::Running;

        for tick in 0..self.max_ticks {
            let next = step(&current, self.window);
            live_cells += next.len() as u64;
            births += next.count_births(&current) as u64;
            totals.push((live_cells, births));

            if next.is_empty() {
                current = next;
                run = RunState::Extinct { tick };
                break;
            }

            if let Some(&first) = visited.get(&next) {
                current = next;
                run = RunState::Cycle { tick, first };
                break;
            }

            if consult_cache
                && let Some(cache) = cache
                && let Some(rest) = cache.lookup(&next)
            {
                if tick.saturating_add(rest.ticks) < self.max_ticks {
                    cache.record_hit(rest.ticks);
                    current = next;
                    run = RunState::CacheHit { tick, rest };
                    break;
                }
                // Every later state lies on the same cached path.
                consult_cache = false;
            }

            visited.insert(next.clone(), tick);
            current = next;
        }

        let ticks_simulated = totals.len() as u64;
        let (termination_tick, termination, tail) = match run {
            RunState::Running => (self.max_ticks, Termination::Survived, Remaining::default()),
            RunState::Extinct { tick } => (tick, Termination::Extinct, Remaining::default()),
            RunState::Cycle { tick, .. } => (tick, Termination::Cycle, Remaining::default()),
            RunState::CacheHit { tick, rest } => (tick + rest.ticks, Termination::CacheHit, rest),
        };
        let final_live_cells = match run {
            RunState::CacheHit { rest, .. } => rest.final_live_cells,
            _ => current.len() as u64,
        };

        if let Some(cache) = cache {
            populate(cache, visited, &totals, &run, tail, final_live_cells);
        }

        Evaluation {
            termination_tick,
            termination,
            total_live_cells: seed.len() as u64 + live_cells + tail.live_cells,
            cells_created: births + tail.births,
            final_live_cells,
            ticks_simulated,
        }
    }
}

/// Offer the visited states of a finished run to the cache.
///
/// A run that used up its budget only bounds its states' lifetimes from below, and the
/// states of a detected cycle would report the lifetime of wherever the run entered it,
/// so neither is stored.
fn populate(
    cache: &SurvivalCache,
    visited: HashMap<BoardState, u64>,
    totals: &[(u64, u64)],
    run: &RunState,
    tail: Remaining,
    final_live_cells: u64,
) {
    let (end, cycle_start) = match *run {
        RunState::Running => return,
        RunState::Extinct { tick } | RunState::CacheHit { tick, .. } => (tick, u64::MAX),
        RunState::Cycle { tick, first } => (tick, first),
    };
    let (end_live, end_births) = totals[end as usize];

    for (state, tick) in visited {
        if tick >= cycle_start {
            continue;
        }
        let (live, births) = totals[tick as usize];
        cache.insert_if_absent(
            state,
            Remaining {
                ticks: end - tick + tail.ticks,
                live_cells: end_live - live + tail.live_cells,
                births: end_births - births + tail.births,
                final_live_cells,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Cell, DenseBoard, advance};

    fn evaluator(max_ticks: u64) -> FitnessEvaluator {
        FitnessEvaluator::new(max_ticks, None)
    }

    /// Dies out after 130 generations and never emits a glider.
    fn diehard() -> BoardState {
        DenseBoard::from_ascii("......*.\n**......\n.*...***").to_state()
    }

    fn glider() -> BoardState {
        DenseBoard::from_ascii(".*.\n..*\n***").to_state()
    }

    fn shifted(state: &BoardState, rows: i32, columns: i32) -> BoardState {
        state
            .iter()
            .map(|c| Cell::new(c.row + rows, c.column + columns))
            .collect()
    }

    /// Everything but the work done and the cause label.
    fn outcome(e: &Evaluation) -> (u64, u64, u64, u64) {
        (
            e.termination_tick,
            e.total_live_cells,
            e.cells_created,
            e.final_live_cells,
        )
    }

    #[test]
    fn test_isolated_cell_extinct_at_tick_zero() {
        let seed = BoardState::from_cells([Cell::new(0, 0)]);
        let result = evaluator(100).evaluate(&seed, None);

        assert_eq!(result.termination_tick, 0);
        assert_eq!(result.termination, Termination::Extinct);
        assert_eq!(result.final_live_cells, 0);
        assert_eq!(result.total_live_cells, 1);
        assert_eq!(result.ticks_simulated, 1);
    }

    #[test]
    fn test_block_detected_as_cycle() {
        // Tick 0 produces the block again; it is recorded, then repeats at tick 1.
        let seed = DenseBoard::from_ascii("**\n**").to_state();
        let result = evaluator(100).evaluate(&seed, None);

        assert_eq!(result.termination, Termination::Cycle);
        assert_eq!(result.termination_tick, 1);
        assert_eq!(result.total_live_cells, 12);
        assert_eq!(result.cells_created, 0);
    }

    #[test]
    fn test_blinker_cycle_and_births() {
        let seed = DenseBoard::from_ascii("***").to_state();
        let result = evaluator(100).evaluate(&seed, None);

        // Tick 0: vertical, tick 1: horizontal, tick 2: vertical again.
        assert_eq!(result.termination, Termination::Cycle);
        assert_eq!(result.termination_tick, 2);
        assert_eq!(result.cells_created, 6);
    }

    #[test]
    fn test_diehard_extinct() {
        let result = evaluator(200).evaluate(&diehard(), None);
        assert_eq!(result.termination, Termination::Extinct);
        assert_eq!(result.termination_tick, 129);
    }

    #[test]
    fn test_budget_exhausted() {
        let result = evaluator(20).evaluate(&glider(), None);

        assert_eq!(result.termination, Termination::Survived);
        assert_eq!(result.termination_tick, 20);
        assert_eq!(result.ticks_simulated, 20);
        assert_eq!(result.final_live_cells, 5);
    }

    #[test]
    fn test_zero_budget() {
        let seed = BoardState::from_cells([Cell::new(0, 0)]);
        let cache = SurvivalCache::new();
        let result = evaluator(0).evaluate(&seed, Some(&cache));

        assert_eq!(result.termination_tick, 0);
        assert_eq!(result.termination, Termination::Survived);
        assert_eq!(result.ticks_simulated, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_window_kills_escaping_glider() {
        let window = Window::square(4);
        let result = FitnessEvaluator::new(1000, Some(window)).evaluate(&glider(), None);

        assert!(result.termination_tick < 1000);
        assert_ne!(result.termination, Termination::Survived);
    }

    #[test]
    fn test_cache_holds_remaining_future() {
        // Tick 0 leaves the centre cell alone, tick 1 is empty.
        let seed = DenseBoard::from_ascii("*..\n.*.\n..*").to_state();
        let cache = SurvivalCache::new();
        let result = evaluator(100).evaluate(&seed, Some(&cache));
        assert_eq!(result.termination_tick, 1);

        let centre = BoardState::from_cells([Cell::new(1, 1)]);
        assert_eq!(
            cache.get(&centre),
            Some(Remaining {
                ticks: 1,
                live_cells: 0,
                births: 0,
                final_live_cells: 0,
            })
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cycle_states_not_cached() {
        let cache = SurvivalCache::new();
        evaluator(100).evaluate(&DenseBoard::from_ascii("***").to_state(), Some(&cache));
        evaluator(100).evaluate(&DenseBoard::from_ascii("**\n**").to_state(), Some(&cache));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_budget_runs_not_cached() {
        let cache = SurvivalCache::new();
        evaluator(20).evaluate(&glider(), Some(&cache));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_warm_cache_matches_cold_run() {
        let seeds = [
            DenseBoard::from_ascii("***"),
            DenseBoard::from_ascii("**\n**"),
            DenseBoard::from_ascii(".**\n**.\n.*."),
            DenseBoard::from_ascii("*.*\n.*.\n*.*"),
            DenseBoard::from_ascii(".*.\n..*\n***"),
        ];
        let evaluator = FitnessEvaluator::new(300, Some(Window::square(30)));
        let shared = SurvivalCache::new();

        for seed in &seeds {
            let state = seed.to_state();
            let plain = evaluator.evaluate(&state, None);

            let fresh = SurvivalCache::new();
            let cold = evaluator.evaluate(&state, Some(&fresh));
            let warm = evaluator.evaluate(&state, Some(&fresh));
            assert_eq!(outcome(&plain), outcome(&cold));
            assert_eq!(outcome(&plain), outcome(&warm));

            let shared_result = evaluator.evaluate(&state, Some(&shared));
            assert_eq!(outcome(&plain), outcome(&shared_result));
        }
    }

    #[test]
    fn test_cached_state_reached_at_later_tick() {
        let cache = SurvivalCache::new();
        let evaluator = evaluator(200);

        // Ten ticks into the diehard: reaches the diehard's tick-10 state at tick 0.
        let seeds = [diehard(), advance(&diehard(), 10, None), advance(&diehard(), 50, None)];
        for seed in &seeds {
            let plain = evaluator.evaluate(seed, None);
            let cached = evaluator.evaluate(seed, Some(&cache));
            assert_eq!(outcome(&cached), outcome(&plain));
        }

        let later = evaluator.evaluate(&seeds[1], Some(&cache));
        assert_eq!(later.termination, Termination::CacheHit);
        assert_eq!(later.termination_tick, 119);
        assert_eq!(later.ticks_simulated, 1);
    }

    #[test]
    fn test_cached_future_past_budget_is_simulated() {
        let cache = SurvivalCache::new();
        evaluator(200).evaluate(&diehard(), Some(&cache));
        let hits = cache.stats().hits;

        // The diehard lasts 129 ticks, past a budget of 100.
        let short = evaluator(100);
        let result = short.evaluate(&diehard(), Some(&cache));
        assert_eq!(result.termination, Termination::Survived);
        assert_eq!(outcome(&result), outcome(&short.evaluate(&diehard(), None)));
        assert_eq!(cache.stats().hits, hits);
    }

    #[test]
    fn test_gliders_sharing_cache_survive_budget() {
        // A glider moves one cell diagonally every four ticks.
        let cache = SurvivalCache::new();
        let evaluator = evaluator(100);
        let seeds = [
            glider(),
            shifted(&glider(), -10, -10),
            advance(&shifted(&glider(), -1, -1), 3, None),
        ];

        for seed in &seeds {
            let plain = evaluator.evaluate(seed, None);
            let cached = evaluator.evaluate(seed, Some(&cache));
            assert_eq!(plain.termination, Termination::Survived);
            assert_eq!(outcome(&cached), outcome(&plain));
        }
    }

    #[test]
    fn test_first_step_cache_hit() {
        let seed = DenseBoard::from_ascii("***").to_state();
        let cache = SurvivalCache::new();
        let rest = Remaining {
            ticks: 40,
            live_cells: 120,
            births: 80,
            final_live_cells: 3,
        };
        cache.insert_if_absent(step(&seed, None), rest);

        let result = evaluator(100).evaluate(&seed, Some(&cache));
        assert_eq!(result.termination, Termination::CacheHit);
        assert_eq!(result.termination_tick, 40);
        assert_eq!(result.ticks_simulated, 1);
        // Seed, tick 0 and the cached remainder.
        assert_eq!(result.total_live_cells, 3 + 3 + 120);
        assert_eq!(result.cells_created, 2 + 80);
        assert_eq!(cache.stats().ticks_saved, 40);
    }

    #[test]
    fn test_cache_entry_past_budget_ignored() {
        let seed = DenseBoard::from_ascii("***").to_state();
        let cache = SurvivalCache::new();
        let rest = Remaining {
            ticks: 500,
            ..Remaining::default()
        };
        cache.insert_if_absent(step(&seed, None), rest);

        let result = evaluator(100).evaluate(&seed, Some(&cache));
        assert_eq!(result.termination, Termination::Cycle);
        assert_eq!(result.termination_tick, 2);
        assert_eq!(cache.stats().hits, 0);
    }
}
