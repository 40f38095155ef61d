//! Configuration types for Game of Life survival search.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Side length of random seed boards.
    #[serde(default = "default_board_size")]
    pub board_size: usize,
    /// Number of random boards evaluated in batch search.
    #[serde(default = "default_trial_count")]
    pub trial_count: usize,
    /// Tick budget per evaluation.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Simulation window applied during evaluation.
    #[serde(default)]
    pub window: WindowConfig,
    /// Evaluate trials on a worker pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Worker count. `None` sizes the pool to the available cores.
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Number of ranked trials to report.
    #[serde(default = "default_report_top")]
    pub report_top: usize,
    /// Log cache diagnostics every N trials (0 disables).
    #[serde(default = "default_diagnostics_interval")]
    pub diagnostics_interval: usize,
    /// Evolutionary search settings.
    #[serde(default)]
    pub evolution: EvolutionConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            trial_count: default_trial_count(),
            max_ticks: default_max_ticks(),
            window: WindowConfig::default(),
            parallel: default_parallel(),
            worker_threads: None,
            random_seed: None,
            report_top: default_report_top(),
            diagnostics_interval: default_diagnostics_interval(),
            evolution: EvolutionConfig::default(),
        }
    }
}

fn default_board_size() -> usize {
    5
}
fn default_trial_count() -> usize {
    10_000
}
fn default_max_ticks() -> u64 {
    10_000
}
fn default_parallel() -> bool {
    true
}
fn default_report_top() -> usize {
    101
}
fn default_diagnostics_interval() -> usize {
    1000
}

/// Settings for the generational search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Boards per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Generation limit for the multi-generation driver.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Fraction of cells flipped in each child (0.0-1.0].
    #[serde(default = "default_mutation_fraction")]
    pub mutation_fraction: f64,
    /// Survivors stop growing once their larger side reaches
    /// `growth_limit * board_size`.
    #[serde(default = "default_growth_limit")]
    pub growth_limit: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            max_generations: default_max_generations(),
            mutation_fraction: default_mutation_fraction(),
            growth_limit: default_growth_limit(),
        }
    }
}

fn default_population_size() -> usize {
    1000
}
fn default_max_generations() -> usize {
    100
}
fn default_mutation_fraction() -> f64 {
    0.1
}
fn default_growth_limit() -> usize {
    2
}

/// Finite simulation window centred on the origin.
///
/// A cell is dropped whenever `|row| >= max_row` or `|column| >= max_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub max_row: i32,
    pub max_column: i32,
}

impl Window {
    pub fn new(max_row: i32, max_column: i32) -> Self {
        Self {
            max_row,
            max_column,
        }
    }

    /// Square window with the same limit on both axes.
    pub fn square(radius: i32) -> Self {
        Self::new(radius, radius)
    }

    /// Whether a cell at (row, column) survives clipping.
    #[inline]
    pub fn contains(&self, row: i32, column: i32) -> bool {
        row.unsigned_abs() < self.max_row.max(0).unsigned_abs()
            && column.unsigned_abs() < self.max_column.max(0).unsigned_abs()
    }
}

/// How the evaluation window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WindowConfig {
    /// Window radius of `max_ticks / divisor` on both axes.
    Derived {
        #[serde(default = "default_window_divisor")]
        divisor: u64,
    },
    /// Explicit window.
    Fixed { max_row: i32, max_column: i32 },
    /// No clipping.
    Unbounded,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::Derived {
            divisor: default_window_divisor(),
        }
    }
}

fn default_window_divisor() -> u64 {
    10
}

impl WindowConfig {
    /// Resolve to a concrete window for a given tick budget.
    pub fn resolve(&self, max_ticks: u64) -> Option<Window> {
        match *self {
            WindowConfig::Derived { divisor } => {
                let radius = (max_ticks / divisor.max(1)).min(i32::MAX as u64) as i32;
                Some(Window::square(radius))
            }
            WindowConfig::Fixed {
                max_row,
                max_column,
            } => Some(Window::new(max_row, max_column)),
            WindowConfig::Unbounded => None,
        }
    }
}

impl SearchConfig {
    /// Window used for evaluations under this config's tick budget.
    pub fn window(&self) -> Option<Window> {
        self.window.resolve(self.max_ticks)
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::InvalidBoardSize);
        }
        if self.trial_count == 0 {
            return Err(ConfigError::InvalidTrialCount);
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::InvalidMaxTicks);
        }
        match self.window {
            WindowConfig::Derived { divisor: 0 } => {
                return Err(ConfigError::InvalidWindow(
                    "Window divisor must be non-zero".into(),
                ));
            }
            WindowConfig::Derived { divisor } if self.max_ticks < divisor => {
                return Err(ConfigError::InvalidWindow(format!(
                    "Tick budget {} over divisor {} leaves a zero-size window",
                    self.max_ticks, divisor
                )));
            }
            WindowConfig::Fixed {
                max_row,
                max_column,
            } if max_row <= 0 || max_column <= 0 => {
                return Err(ConfigError::InvalidWindow(format!(
                    "Window limits ({}, {}) must be positive",
                    max_row, max_column
                )));
            }
            _ => {}
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::InvalidWorkerThreads);
        }
        self.evolution.validate()
    }
}

impl EvolutionConfig {
    /// Validate evolution parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        validate_fraction(self.mutation_fraction)?;
        if self.growth_limit == 0 {
            return Err(ConfigError::InvalidGrowthLimit);
        }
        Ok(())
    }
}

/// Check that a mutation fraction lies in (0, 1].
pub fn validate_fraction(fraction: f64) -> Result<(), ConfigError> {
    // Written so NaN fails too.
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMutationFraction(fraction))
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Board size must be non-zero")]
    InvalidBoardSize,
    #[error("Trial count must be non-zero")]
    InvalidTrialCount,
    #[error("Tick budget must be non-zero")]
    InvalidMaxTicks,
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
    #[error("Worker thread count must be non-zero")]
    InvalidWorkerThreads,
    #[error("Population size must be non-zero")]
    InvalidPopulationSize,
    #[error("Mutation fraction {0} must be in (0, 1]")]
    InvalidMutationFraction(f64),
    #[error("Growth limit must be non-zero")]
    InvalidGrowthLimit,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
