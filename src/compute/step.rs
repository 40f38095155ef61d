//! Game of Life transition function.
//!
//! B3/S23: a cell is alive next tick iff it has exactly three live neighbors, or
//! exactly two and is already alive.

use std::collections::HashMap;

use crate::schema::Window;

use super::{BoardState, Cell};

/// Compute the next tick.
///
/// With a window, any cell outside it is dropped regardless of the rule outcome, which
/// keeps escaping gliders from growing the state without limit.
pub fn step(state: &BoardState, window: Option<Window>) -> BoardState {
    let mut neighbor_counts: HashMap<Cell, u8> = HashMap::with_capacity(state.len() * 8);
    for cell in state.iter() {
        for neighbor in cell.neighbors() {
            *neighbor_counts.entry(neighbor).or_insert(0) += 1;
        }
    }

    neighbor_counts
        .into_iter()
        .filter(|&(cell, count)| count == 3 || (count == 2 && state.contains(cell)))
        .filter(|&(cell, _)| window.is_none_or(|w| w.contains(cell.row, cell.column)))
        .map(|(cell, _)| cell)
        .collect()
}

/// Apply [`step`] `ticks` times.
pub fn advance(state: &BoardState, ticks: u64, window: Option<Window>) -> BoardState {
    let mut current = state.clone();
    for _ in 0..ticks {
        if current.is_empty() {
            break;
        }
        current = step(&current, window);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::DenseBoard;
    use proptest::prelude::*;

    fn cells(coords: &[(i32, i32)]) -> BoardState {
        coords.iter().map(|&(r, c)| Cell::new(r, c)).collect()
    }

    #[test]
    fn test_block_is_stable() {
        let block = cells(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        let mut state = block.clone();
        for _ in 0..5 {
            state = step(&state, None);
            assert_eq!(state, block);
        }
    }

    #[test]
    fn test_blinker_period_two() {
        let blinker = cells(&[(0, -1), (0, 0), (0, 1)]);
        let once = step(&blinker, None);
        assert_eq!(once, cells(&[(-1, 0), (0, 0), (1, 0)]));
        assert_eq!(step(&once, None), blinker);
    }

    #[test]
    fn test_isolated_cell_dies() {
        let single = cells(&[(3, 3)]);
        assert!(step(&single, None).is_empty());
        assert!(step(&BoardState::new(), None).is_empty());
    }

    #[test]
    fn test_glider_translates() {
        let glider = DenseBoard::from_ascii(".*.\n..*\n***").to_state();
        let moved = advance(&glider, 4, None);
        let expected: BoardState = glider.iter().map(|c| Cell::new(c.row + 1, c.column + 1)).collect();
        assert_eq!(moved, expected);
    }

    #[test]
    fn test_window_clips_cells() {
        // Blinker oscillating vertically; rows +-1 fall outside a row limit of 1.
        let blinker = cells(&[(0, -1), (0, 0), (0, 1)]);
        let clipped = step(&blinker, Some(Window::new(1, 10)));
        assert_eq!(clipped, cells(&[(0, 0)]));

        let open = step(&blinker, Some(Window::new(2, 10)));
        assert_eq!(open.len(), 3);
    }

    #[test]
    fn test_block_at_plane_edge() {
        let max = i32::MAX;
        let block = cells(&[(max - 1, max - 1), (max - 1, max), (max, max - 1), (max, max)]);
        assert_eq!(step(&block, None), block);
    }

    #[test]
    fn test_advance_zero_ticks() {
        let blinker = cells(&[(0, -1), (0, 0), (0, 1)]);
        assert_eq!(advance(&blinker, 0, None), blinker);
        assert_eq!(advance(&blinker, 2, None), blinker);
    }

    fn arb_state() -> impl Strategy<Value = BoardState> {
        prop::collection::vec((-6i32..6, -6i32..6), 0..40)
            .prop_map(|coords| coords.into_iter().map(|(r, c)| Cell::new(r, c)).collect())
    }

    proptest! {
        #[test]
        fn prop_step_is_deterministic(state in arb_state()) {
            prop_assert_eq!(step(&state, None), step(&state, None));
        }

        #[test]
        fn prop_window_bounds_result(state in arb_state(), radius in 1i32..8) {
            let window = Window::square(radius);
            let next = step(&state, Some(window));
            prop_assert!(next.iter().all(|c| c.row.abs() < radius && c.column.abs() < radius));
        }
    }
}
