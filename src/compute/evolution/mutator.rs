//! Board generation and mutation.
//!
//! Mutation flips an exact number of distinct cells, so a child always differs from
//! its parent by the requested amount: never fewer flips, never a double flip.

use std::collections::HashSet;

use rand::prelude::*;

use crate::compute::DenseBoard;
use crate::schema::{ConfigError, validate_fraction};

/// Fraction of cells set alive in a fresh random board.
pub const RANDOM_BOARD_FRACTION: f64 = 0.5;

/// Random number generator wrapper for board operations.
pub struct BoardRng {
    rng: StdRng,
}

impl BoardRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Copy of `board` with `floor(area * fraction)` distinct cells flipped.
    pub fn mutate(&mut self, board: &DenseBoard, fraction: f64) -> Result<DenseBoard, ConfigError> {
        validate_fraction(fraction)?;
        Ok(self.flip_distinct(board, flip_count(board.area(), fraction)))
    }

    /// Random `size` x `size` board: half the cells of a dead board flipped on.
    pub fn random_board(&mut self, size: usize) -> DenseBoard {
        let dead = DenseBoard::square(size);
        let count = flip_count(dead.area(), RANDOM_BOARD_FRACTION);
        self.flip_distinct(&dead, count)
    }

    /// Flip exactly `count` distinct positions, picked by rejection sampling.
    fn flip_distinct(&mut self, board: &DenseBoard, count: usize) -> DenseBoard {
        let mut child = board.clone();
        let area = board.area();
        let count = count.min(area);

        let mut flipped: HashSet<usize> = HashSet::with_capacity(count);
        while flipped.len() < count {
            let index = self.rng.gen_range(0..area);
            if flipped.insert(index) {
                child.toggle_index(index);
            }
        }
        child
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

/// Number of cells a mutation of `fraction` flips on a board of `area` cells:
/// `floor(area * fraction)`, capped at `area`.
///
/// The product is nudged up by a relative 1e-9 before flooring so a product that is
/// exact in decimal but lands just under an integer in binary (`100 * 0.29`) still
/// floors to that integer.
#[inline]
pub fn flip_count(area: usize, fraction: f64) -> usize {
    let product = area as f64 * fraction;
    ((product + product.abs() * 1e-9).floor() as usize).min(area)
}
