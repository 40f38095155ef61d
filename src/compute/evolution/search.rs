//! Population management: batch search and generational evolution.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::compute::{DenseBoard, SurvivalCache, step};
use crate::schema::{
    CacheStats, ConfigError, EvolutionHistory, EvolutionStats, GenerationStats, SearchConfig,
    StopReason, Window,
};

use super::fitness::{Evaluation, FitnessEvaluator};
use super::mutator::BoardRng;

/// One evaluated seed board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    /// The seed board.
    pub seed: DenseBoard,
    /// Its evaluation.
    pub evaluation: Evaluation,
}

impl Trial {
    /// Tick at which the seed terminated.
    #[inline]
    pub fn survival_ticks(&self) -> u64 {
        self.evaluation.termination_tick
    }
}

/// Boards produced by one evolutionary step.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The next population.
    pub boards: Vec<DenseBoard>,
    /// Summary of the population that produced it.
    pub stats: GenerationStats,
}

/// Final result of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Longest-lived board seen in any generation.
    pub best: Option<Trial>,
    /// Last population that was evaluated.
    pub population: Vec<DenseBoard>,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Per-generation history.
    pub history: EvolutionHistory,
}

/// Search engine errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("No board out of {evaluated} survived past tick {threshold}; search exhausted")]
    PopulationExhausted { evaluated: usize, threshold: u64 },
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Children per survivor: `floor(total_i * deficit / sum) + 1`.
///
/// `totals` are the survivors' accumulated live-cell counts and `deficit` the number
/// of boards that failed the threshold. Every survivor gets at least one child.
pub fn reproduction_counts(totals: &[u64], deficit: usize) -> Vec<usize> {
    let sum: u128 = totals.iter().map(|&t| u128::from(t)).sum();
    if sum == 0 {
        return vec![1; totals.len()];
    }
    totals
        .iter()
        .map(|&t| (u128::from(t) * deficit as u128 / sum) as usize + 1)
        .collect()
}

/// Drives batch searches and evolutionary steps over one shared survival cache.
pub struct SearchEngine {
    config: SearchConfig,
    rng: BoardRng,
    cache: SurvivalCache,
    /// Window the cached futures were computed under, once one has been used.
    cache_window: Option<Option<Window>>,
    pool: Option<rayon::ThreadPool>,
    cancelled: Arc<AtomicBool>,
}

impl SearchEngine {
    /// Create a new search engine. The config is validated first.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let pool = match config.worker_threads {
            Some(threads) if config.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            _ => None,
        };

        Ok(Self {
            config,
            rng: BoardRng::new(seed),
            cache: SurvivalCache::new(),
            cache_window: None,
            pool,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The shared survival cache.
    pub fn cache(&self) -> &SurvivalCache {
        &self.cache
    }

    /// Get cancellation handle.
    ///
    /// Checked before each trial and between generations.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Evaluator for a budget, resetting the cache if its entries were computed under
    /// a different window.
    ///
    /// Cached futures do not depend on the budget, so they survive a budget change
    /// that leaves the window alone.
    fn evaluator_for(&mut self, max_ticks: u64) -> FitnessEvaluator {
        let evaluator = FitnessEvaluator::new(max_ticks, self.config.window.resolve(max_ticks));
        if self.cache_window != Some(evaluator.window()) {
            if !self.cache.is_empty() {
                log::info!(
                    "Simulation window changed; dropping {} cached states",
                    self.cache.len()
                );
                self.cache.clear();
            }
            self.cache_window = Some(evaluator.window());
        }
        evaluator
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Evaluate one board under the configured tick budget.
    pub fn evaluate(&mut self, board: &DenseBoard) -> Evaluation {
        let evaluator = self.evaluator_for(self.config.max_ticks);
        evaluator.evaluate(&board.to_state(), Some(&self.cache))
    }

    /// Batch search with the configured trial count, board size and budget, ranked.
    pub fn run(&mut self) -> Result<Vec<Trial>, SearchError> {
        let (count, size, max_ticks) = (
            self.config.trial_count,
            self.config.board_size,
            self.config.max_ticks,
        );
        let mut trials = self.run_trials(count, size, max_ticks)?;
        super::rank_trials(&mut trials);
        Ok(trials)
    }

    /// Evaluate `count` independent random `size` x `size` boards.
    ///
    /// Results come back in no particular order; rank them with
    /// [`rank_trials`](super::rank_trials). A cancelled run returns the trials that
    /// finished.
    pub fn run_trials(
        &mut self,
        count: usize,
        size: usize,
        max_ticks: u64,
    ) -> Result<Vec<Trial>, SearchError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if size == 0 {
            return Err(ConfigError::InvalidBoardSize.into());
        }

        let evaluator = self.evaluator_for(max_ticks);
        // One RNG seed per trial keeps results independent of scheduling.
        let seeds: Vec<u64> = (0..count).map(|_| self.rng.next_seed()).collect();
        let diagnostics = Diagnostics::new(self.config.diagnostics_interval, self.cache.stats());

        let cache = &self.cache;
        let cancelled = &self.cancelled;
        let run_one = |seed: u64| -> Option<Trial> {
            if cancelled.load(Ordering::Relaxed) {
                return None;
            }
            let board = BoardRng::new(seed).random_board(size);
            let evaluation = evaluator.evaluate(&board.to_state(), Some(cache));
            diagnostics.trial_finished(cache);
            Some(Trial {
                seed: board,
                evaluation,
            })
        };

        let trials: Vec<Trial> = if self.config.parallel {
            self.install(|| seeds.into_par_iter().filter_map(run_one).collect())
        } else {
            seeds.into_iter().filter_map(run_one).collect()
        };

        if trials.len() < count {
            log::warn!("Cancelled after {} of {} trials", trials.len(), count);
        }
        log::debug!(
            "Ran {} trials of size {} ({} cached states)",
            trials.len(),
            size,
            self.cache.len()
        );

        Ok(trials)
    }

    /// Evaluate every board (in input order).
    fn evaluate_boards(&self, boards: &[DenseBoard], evaluator: FitnessEvaluator) -> Vec<Evaluation> {
        let cache = &self.cache;
        let evaluate = |board: &DenseBoard| evaluator.evaluate(&board.to_state(), Some(cache));

        if self.config.parallel {
            self.install(|| boards.par_iter().map(evaluate).collect())
        } else {
            boards.iter().map(evaluate).collect()
        }
    }

    /// One evolutionary step.
    ///
    /// Boards whose termination tick exceeds `max_ticks / 2` survive. Each survivor is
    /// grown a tick (until it reaches the growth limit) and spawns mutated children in
    /// proportion to its share of the survivors' live-cell totals, refilling the
    /// population toward its original size. Fails with
    /// [`SearchError::PopulationExhausted`] when nothing survives.
    pub fn next_generation(
        &mut self,
        current: &[DenseBoard],
        max_ticks: u64,
    ) -> Result<Generation, SearchError> {
        let evaluator = self.evaluator_for(max_ticks);
        let evaluations = self.evaluate_boards(current, evaluator);
        self.reproduce(current, &evaluations, max_ticks)
    }

    fn reproduce(
        &mut self,
        current: &[DenseBoard],
        evaluations: &[Evaluation],
        max_ticks: u64,
    ) -> Result<Generation, SearchError> {
        let threshold = max_ticks / 2;
        let survivors: Vec<(&DenseBoard, &Evaluation)> = current
            .iter()
            .zip(evaluations)
            .filter(|(_, e)| e.termination_tick > threshold)
            .collect();

        if survivors.is_empty() {
            return Err(SearchError::PopulationExhausted {
                evaluated: current.len(),
                threshold,
            });
        }

        let deficit = current.len() - survivors.len();
        let totals: Vec<u64> = survivors.iter().map(|(_, e)| e.total_live_cells).collect();
        let counts = reproduction_counts(&totals, deficit);

        let max_linear_size = self.config.evolution.growth_limit * self.config.board_size;
        let fraction = self.config.evolution.mutation_fraction;

        let mut boards = Vec::with_capacity(counts.iter().sum());
        for ((board, _), &children) in survivors.iter().zip(&counts) {
            let parent = grow_survivor(board, max_linear_size);
            for _ in 0..children {
                boards.push(self.rng.mutate(&parent, fraction)?);
            }
        }

        let stats = GenerationStats {
            generation: 0,
            population: current.len(),
            survivors: survivors.len(),
            children: boards.len(),
            best_tick: best_tick(evaluations),
            average_tick: mean_tick(evaluations),
        };

        Ok(Generation { boards, stats })
    }

    /// Run evolution with progress callback.
    ///
    /// Starts from `population_size` random boards and steps generations until the
    /// generation limit, exhaustion, or cancellation.
    pub fn run_evolution_with_callback<F>(&mut self, callback: F) -> Result<EvolutionResult, SearchError>
    where
        F: Fn(&GenerationStats),
    {
        let start_time = Instant::now();
        let size = self.config.board_size;
        let max_ticks = self.config.max_ticks;
        let max_generations = self.config.evolution.max_generations;

        let mut population: Vec<DenseBoard> = (0..self.config.evolution.population_size)
            .map(|_| self.rng.random_board(size))
            .collect();
        let mut history = EvolutionHistory::default();
        let mut best: Option<Trial> = None;
        let mut total_evaluations = 0u64;
        let mut generation = 0usize;

        let stop_reason = loop {
            if self.is_cancelled() {
                break StopReason::Cancelled;
            }
            if generation >= max_generations {
                break StopReason::MaxGenerations;
            }

            let evaluator = self.evaluator_for(max_ticks);
            let evaluations = self.evaluate_boards(&population, evaluator);
            total_evaluations += evaluations.len() as u64;

            if let Some((board, evaluation)) = population
                .iter()
                .zip(&evaluations)
                .max_by_key(|(_, e)| e.termination_tick)
                && best
                    .as_ref()
                    .is_none_or(|b| evaluation.termination_tick > b.survival_ticks())
            {
                best = Some(Trial {
                    seed: board.clone(),
                    evaluation: *evaluation,
                });
            }

            match self.reproduce(&population, &evaluations, max_ticks) {
                Ok(next) => {
                    let stats = GenerationStats {
                        generation,
                        ..next.stats
                    };
                    log::info!(
                        "Generation {}: {} of {} above tick {}, best {}, avg {:.1}, {} children",
                        generation,
                        stats.survivors,
                        stats.population,
                        max_ticks / 2,
                        stats.best_tick,
                        stats.average_tick,
                        stats.children
                    );
                    history.record(&stats);
                    callback(&stats);
                    population = next.boards;
                    generation += 1;
                }
                Err(SearchError::PopulationExhausted {
                    evaluated,
                    threshold,
                }) => {
                    log::warn!(
                        "Generation {}: none of {} boards survived past tick {}; stopping",
                        generation,
                        evaluated,
                        threshold
                    );
                    let stats = GenerationStats {
                        generation,
                        population: evaluated,
                        survivors: 0,
                        children: 0,
                        best_tick: best_tick(&evaluations),
                        average_tick: mean_tick(&evaluations),
                    };
                    history.record(&stats);
                    callback(&stats);
                    generation += 1;
                    break StopReason::Exhausted;
                }
                Err(e) => return Err(e),
            }
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        let stats = EvolutionStats {
            generations: generation,
            total_evaluations,
            best_tick: best.as_ref().map_or(0, Trial::survival_ticks),
            elapsed_seconds: elapsed,
            evaluations_per_second: total_evaluations as f64 / elapsed.max(f64::EPSILON),
            cache: self.cache.stats(),
            stop_reason,
        };

        Ok(EvolutionResult {
            best,
            population,
            stats,
            history,
        })
    }

    /// Run evolution (blocking).
    pub fn run_evolution(&mut self) -> Result<EvolutionResult, SearchError> {
        self.run_evolution_with_callback(|_| {})
    }
}

fn best_tick(evaluations: &[Evaluation]) -> u64 {
    evaluations
        .iter()
        .map(|e| e.termination_tick)
        .max()
        .unwrap_or(0)
}

fn mean_tick(evaluations: &[Evaluation]) -> f64 {
    if evaluations.is_empty() {
        return 0.0;
    }
    evaluations
        .iter()
        .map(|e| e.termination_tick as f64)
        .sum::<f64>()
        / evaluations.len() as f64
}

/// Advance a survivor one unbounded tick, unless it has reached `max_linear_size`.
///
/// A board that would die out on that tick is kept as is.
pub fn grow_survivor(board: &DenseBoard, max_linear_size: usize) -> DenseBoard {
    if board.linear_size() >= max_linear_size {
        return board.clone();
    }
    DenseBoard::from_state(&step(&board.to_state(), None)).unwrap_or_else(|_| board.clone())
}

/// Periodic cache diagnostics during a batch search.
struct Diagnostics {
    interval: usize,
    completed: AtomicUsize,
    last: Mutex<(Instant, CacheStats)>,
}

impl Diagnostics {
    fn new(interval: usize, baseline: CacheStats) -> Self {
        Self {
            interval,
            completed: AtomicUsize::new(0),
            last: Mutex::new((Instant::now(), baseline)),
        }
    }

    fn trial_finished(&self, cache: &SurvivalCache) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.interval == 0 || done % self.interval != 0 || !log::log_enabled!(log::Level::Info) {
            return;
        }

        let (elapsed, delta) = self.start_interval(cache);
        log::info!(
            "{} trials done; last {} took {:.2}s. {} cache hits saved {} ticks ({:.1}% hit rate), {} states cached",
            done,
            self.interval,
            elapsed.as_secs_f64(),
            delta.hits,
            delta.ticks_saved,
            delta.hit_rate() * 100.0,
            delta.entries
        );
    }

    /// Time and cache activity since the previous call.
    fn start_interval(&self, cache: &SurvivalCache) -> (Duration, CacheStats) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let stats = cache.stats();
        let interval = (now.duration_since(last.0), stats.since(&last.1));
        *last = (now, stats);
        interval
    }
}
