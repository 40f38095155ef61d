//! Progress, statistics and result types for survival search runs.

use serde::{Deserialize, Serialize};

/// Counters kept by the survival cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Distinct board states stored.
    pub entries: usize,
    /// Cache lookups performed.
    pub lookups: u64,
    /// Lookups that found a stored state.
    pub hits: u64,
    /// Ticks that did not need simulating thanks to hits.
    pub ticks_saved: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit.
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }

    /// Counter deltas since an earlier snapshot. `entries` stays absolute.
    pub fn since(&self, earlier: &CacheStats) -> CacheStats {
        CacheStats {
            entries: self.entries,
            lookups: self.lookups.saturating_sub(earlier.lookups),
            hits: self.hits.saturating_sub(earlier.hits),
            ticks_saved: self.ticks_saved.saturating_sub(earlier.ticks_saved),
        }
    }
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index (0 = random initial population).
    pub generation: usize,
    /// Boards evaluated.
    pub population: usize,
    /// Boards above the survival threshold.
    pub survivors: usize,
    /// Children produced for the next generation.
    pub children: usize,
    /// Longest survival this generation.
    pub best_tick: u64,
    /// Mean survival this generation.
    pub average_tick: f64,
}

/// Per-generation history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best termination tick per generation.
    pub best_tick: Vec<u64>,
    /// Mean termination tick per generation.
    pub average_tick: Vec<f64>,
    /// Survivor count per generation.
    pub survivors: Vec<usize>,
    /// Population size per generation.
    pub population: Vec<usize>,
}

impl EvolutionHistory {
    pub fn record(&mut self, stats: &GenerationStats) {
        self.best_tick.push(stats.best_tick);
        self.average_tick.push(stats.average_tick);
        self.survivors.push(stats.survivors);
        self.population.push(stats.population);
    }

    pub fn len(&self) -> usize {
        self.best_tick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_tick.is_empty()
    }
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations evaluated.
    pub generations: usize,
    /// Total board evaluations.
    pub total_evaluations: u64,
    /// Best termination tick seen.
    pub best_tick: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Survival cache counters at the end of the run.
    pub cache: CacheStats,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached maximum generations.
    MaxGenerations,
    /// No board cleared the survival threshold.
    Exhausted,
    /// User cancelled.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_delta() {
        let earlier = CacheStats {
            entries: 10,
            lookups: 100,
            hits: 5,
            ticks_saved: 40,
        };
        let later = CacheStats {
            entries: 25,
            lookups: 180,
            hits: 9,
            ticks_saved: 100,
        };
        let delta = later.since(&earlier);
        assert_eq!(delta.entries, 25);
        assert_eq!(delta.lookups, 80);
        assert_eq!(delta.hits, 4);
        assert_eq!(delta.ticks_saved, 60);
        assert!((delta.hit_rate() - 0.05).abs() < 1e-9);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_history_record() {
        let mut history = EvolutionHistory::default();
        assert!(history.is_empty());
        history.record(&GenerationStats {
            generation: 0,
            population: 10,
            survivors: 3,
            children: 10,
            best_tick: 42,
            average_tick: 12.5,
        });
        assert_eq!(history.len(), 1);
        assert_eq!(history.best_tick, vec![42]);
        assert_eq!(history.survivors, vec![3]);
    }

    #[test]
    fn test_stop_reason_serialization() {
        let json = serde_json::to_string(&StopReason::Exhausted).unwrap();
        let parsed: StopReason = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, StopReason::Exhausted);
    }
}
