//! Survival cache shared across trials.
//!
//! Maps board states to a summary of their future: how many ticks they have left before
//! termination and what those ticks add to a run's totals. Only states whose future is
//! fully determined by the state itself are stored, so a hit gives exactly what running
//! the board on would have. Entries are first-writer-wins and never evicted for the
//! life of a run.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::schema::CacheStats;

use super::BoardState;

/// What remains of a run after a cached state.
///
/// Counts cover the states produced after the cached one, up to and including the
/// terminating state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Remaining {
    /// Ticks until termination.
    pub ticks: u64,
    /// Live cells summed over those ticks.
    pub live_cells: u64,
    /// Births summed over those ticks.
    pub births: u64,
    /// Live cells in the terminating state.
    pub final_live_cells: u64,
}

/// Concurrent map from board state to its [`Remaining`] future.
///
/// Backed by a sharded map so parallel trials can look up and insert without a global
/// lock. Insertion goes through the shard's entry API, so two trials finishing on the
/// same new state cannot both write it.
#[derive(Debug, Default)]
pub struct SurvivalCache {
    entries: DashMap<BoardState, Remaining>,
    lookups: AtomicU64,
    hits: AtomicU64,
    ticks_saved: AtomicU64,
}

impl SurvivalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a state, counting the lookup.
    ///
    /// A returned entry only counts as a hit once the caller uses it; see
    /// [`record_hit`](Self::record_hit).
    pub fn lookup(&self, state: &BoardState) -> Option<Remaining> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.get(state)
    }

    /// Count a used entry and the ticks it skipped.
    pub fn record_hit(&self, ticks_saved: u64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.ticks_saved.fetch_add(ticks_saved, Ordering::Relaxed);
    }

    /// Read without touching the counters.
    pub fn get(&self, state: &BoardState) -> Option<Remaining> {
        self.entries.get(state).map(|entry| *entry.value())
    }

    /// Store `remaining` for `state` unless it is already present.
    ///
    /// Returns `true` if this call wrote the entry.
    pub fn insert_if_absent(&self, state: BoardState, remaining: Remaining) -> bool {
        match self.entries.entry(state) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(remaining);
                true
            }
        }
    }

    /// Number of stored states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        self.entries.clear();
        self.lookups.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.ticks_saved.store(0, Ordering::Relaxed);
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            ticks_saved: self.ticks_saved.load(Ordering::Relaxed),
        }
    }
}
