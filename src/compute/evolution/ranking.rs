//! Ranking and reporting of evaluated trials.

use std::cmp::Reverse;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::compute::DenseBoard;

use super::fitness::Termination;
use super::search::Trial;

/// Sort trials by survival tick, longest first. Ties keep no particular order.
pub fn rank_trials(trials: &mut [Trial]) {
    trials.sort_unstable_by_key(|t| Reverse(t.survival_ticks()));
}

/// The first `n` trials as `(seed, survival tick)` pairs.
///
/// Expects `trials` already ranked.
pub fn top_trials(trials: &[Trial], n: usize) -> Vec<(DenseBoard, u64)> {
    trials
        .iter()
        .take(n)
        .map(|t| (t.seed.clone(), t.survival_ticks()))
        .collect()
}

/// Plain-text report: each board drawn with `*` for live cells, followed by its tick.
pub fn render_report(ranked: &[(DenseBoard, u64)]) -> String {
    let mut out = String::new();
    for (board, ticks) in ranked {
        // Writing into a String cannot fail.
        let _ = write!(out, "{board}");
        let _ = writeln!(out, "{ticks}");
    }
    out
}

/// Serializable summary of one ranked trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Position in the ranking, starting at 1.
    pub rank: usize,
    /// Seed board rows, `*` alive and `.` dead.
    pub seed: Vec<String>,
    pub survival_ticks: u64,
    pub termination: Termination,
    pub total_live_cells: u64,
    pub cells_created: u64,
}

impl TrialSummary {
    pub fn new(rank: usize, trial: &Trial) -> Self {
        Self {
            rank,
            seed: trial
                .seed
                .row_slices()
                .map(|row| row.iter().map(|&alive| if alive { '*' } else { '.' }).collect())
                .collect(),
            survival_ticks: trial.survival_ticks(),
            termination: trial.evaluation.termination,
            total_live_cells: trial.evaluation.total_live_cells,
            cells_created: trial.evaluation.cells_created,
        }
    }
}

/// Summaries of the first `n` ranked trials.
pub fn summarize(trials: &[Trial], n: usize) -> Vec<TrialSummary> {
    trials
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, t)| TrialSummary::new(i + 1, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::Evaluation;

    fn trial(ascii: &str, ticks: u64) -> Trial {
        Trial {
            seed: DenseBoard::from_ascii(ascii),
            evaluation: Evaluation {
                termination_tick: ticks,
                termination: Termination::Cycle,
                total_live_cells: ticks * 3,
                cells_created: 0,
                final_live_cells: 3,
                ticks_simulated: ticks,
            },
        }
    }

    #[test]
    fn test_rank_descending() {
        let mut trials = vec![trial("*", 3), trial("**", 40), trial("***", 7)];
        rank_trials(&mut trials);
        let ticks: Vec<u64> = trials.iter().map(Trial::survival_ticks).collect();
        assert_eq!(ticks, vec![40, 7, 3]);
    }

    #[test]
    fn test_top_trials_truncates() {
        let mut trials = vec![trial("*", 1), trial("**", 2), trial("***", 3)];
        rank_trials(&mut trials);

        let top = top_trials(&trials, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], (DenseBoard::from_ascii("***"), 3));

        assert_eq!(top_trials(&trials, 101).len(), 3);
        assert!(top_trials(&[], 5).is_empty());
    }

    #[test]
    fn test_render_report() {
        let ranked = vec![
            (DenseBoard::from_ascii("*.\n.*"), 12),
            (DenseBoard::from_ascii("***"), 2),
        ];
        assert_eq!(render_report(&ranked), "* \n *\n12\n***\n2\n");
    }

    #[test]
    fn test_summary_json() {
        let trials = vec![trial(".*\n**", 9)];
        let summaries = summarize(&trials, 10);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].rank, 1);
        assert_eq!(summaries[0].seed, vec![".*".to_string(), "**".to_string()]);

        let json = serde_json::to_string(&summaries).unwrap();
        let parsed: Vec<TrialSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summaries);
    }
}
