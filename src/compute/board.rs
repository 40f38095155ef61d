//! Board representations for Game of Life configurations.
//!
//! Two interchangeable forms are used:
//!
//! - [`BoardState`]: the sparse set of live cells on an unbounded plane. This is what
//!   the step function consumes and produces, and what the survival cache is keyed on.
//! - [`DenseBoard`]: a rectangular grid of booleans, used for seeding, mutation and
//!   reporting.

use std::fmt;

/// Neighbor offsets in the Moore (8-cell) neighborhood.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A cell coordinate on the plane.
///
/// The plane is the representable `i32` range. Coordinates past the edge do not
/// exist, so cells on the extreme rows and columns simply have fewer neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i32,
    pub column: i32,
}

impl Cell {
    #[inline]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Offset this cell, or `None` if the result leaves the plane.
    #[inline]
    pub fn offset(self, rows: i32, columns: i32) -> Option<Cell> {
        Some(Cell {
            row: self.row.checked_add(rows)?,
            column: self.column.checked_add(columns)?,
        })
    }

    /// The neighbors of this cell that exist on the plane.
    #[inline]
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc))
    }
}

/// Set of live cells at one tick.
///
/// Cells are kept sorted and deduplicated, so two states holding the same live cells
/// compare and hash equal regardless of how they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoardState {
    cells: Vec<Cell>,
}

impl BoardState {
    /// Empty state (no live cells).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from any collection of cells. Duplicates collapse.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let mut cells: Vec<Cell> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        Self { cells }
    }

    /// Number of live cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `cell` is alive.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Live cells in (row, column) order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Smallest and largest occupied coordinates, or `None` when empty.
    pub fn bounding_box(&self) -> Option<(Cell, Cell)> {
        let first = self.cells.first()?;
        let last = self.cells.last()?;

        // Rows come sorted; columns need a scan.
        let (min_column, max_column) = self
            .cells
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), c| {
                (lo.min(c.column), hi.max(c.column))
            });

        Some((
            Cell::new(first.row, min_column),
            Cell::new(last.row, max_column),
        ))
    }

    /// Count cells alive here that were dead in `previous`.
    pub fn count_births(&self, previous: &BoardState) -> usize {
        // Merge walk over the two sorted cell lists.
        let mut births = 0;
        let mut older = previous.cells.iter().peekable();
        for cell in &self.cells {
            while older.next_if(|c| *c < cell).is_some() {}
            if older.peek() != Some(&cell) {
                births += 1;
            }
        }
        births
    }
}

impl FromIterator<Cell> for BoardState {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self::from_cells(iter)
    }
}

impl From<&DenseBoard> for BoardState {
    fn from(board: &DenseBoard) -> Self {
        board.to_state()
    }
}

/// Converting an empty [`BoardState`] to a [`DenseBoard`] has no bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot build a dense board from a state with no live cells")]
pub struct EmptyBoardError;

/// Rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DenseBoard {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl DenseBoard {
    /// All-dead board of the given dimensions.
    pub fn dead(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![false; rows * columns],
        }
    }

    /// All-dead `size` x `size` board.
    pub fn square(size: usize) -> Self {
        Self::dead(size, size)
    }

    /// Parse a board from text: `*`, `o`, `O` or `#` are alive, anything else is
    /// dead. Short lines are padded with dead cells.
    pub fn from_ascii(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let rows = lines.len();
        let columns = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut board = Self::dead(rows, columns);
        for (row, line) in lines.iter().enumerate() {
            for (column, ch) in line.chars().enumerate() {
                if matches!(ch, '*' | 'o' | 'O' | '#') {
                    board.set(row, column, true);
                }
            }
        }
        board
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of cells (`rows * columns`).
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Larger of the two dimensions.
    #[inline]
    pub fn linear_size(&self) -> usize {
        self.rows.max(self.columns)
    }

    #[inline]
    fn idx(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Cell value; out-of-range positions read as dead.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns && self.cells[self.idx(row, column)]
    }

    /// Set a cell. Panics if out of range.
    #[inline]
    pub fn set(&mut self, row: usize, column: usize, alive: bool) {
        assert!(row < self.rows && column < self.columns);
        let idx = self.idx(row, column);
        self.cells[idx] = alive;
    }

    /// Flip the cell at a flat row-major index.
    #[inline]
    pub fn toggle_index(&mut self, index: usize) {
        self.cells[index] = !self.cells[index];
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Number of positions whose value differs between the two boards.
    ///
    /// Boards of different shapes are compared over the union of their extents.
    pub fn differing_cells(&self, other: &DenseBoard) -> usize {
        if self.rows == other.rows && self.columns == other.columns {
            return self
                .cells
                .iter()
                .zip(&other.cells)
                .filter(|(a, b)| a != b)
                .count();
        }

        let rows = self.rows.max(other.rows);
        let columns = self.columns.max(other.columns);
        (0..rows)
            .flat_map(|r| (0..columns).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c) != other.get(r, c))
            .count()
    }

    /// Rows of the board as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[bool]> {
        // chunks() rejects a zero size
        self.cells.chunks(self.columns.max(1))
    }

    /// Live cells, placing grid position (r, c) at `Cell(r, c)`.
    pub fn to_state(&self) -> BoardState {
        let mut cells = Vec::with_capacity(self.live_count());
        for row in 0..self.rows {
            for column in 0..self.columns {
                if self.cells[self.idx(row, column)] {
                    cells.push(Cell::new(row as i32, column as i32));
                }
            }
        }
        // Already row-major, which is the state's canonical order.
        BoardState { cells }
    }

    /// Crop a state to its occupied bounding box.
    ///
    /// The top-left of the box lands at (0, 0).
    pub fn from_state(state: &BoardState) -> Result<Self, EmptyBoardError> {
        let (min, max) = state.bounding_box().ok_or(EmptyBoardError)?;
        let rows = (i64::from(max.row) - i64::from(min.row) + 1) as usize;
        let columns = (i64::from(max.column) - i64::from(min.column) + 1) as usize;

        let mut board = Self::dead(rows, columns);
        for cell in state.iter() {
            let row = (i64::from(cell.row) - i64::from(min.row)) as usize;
            let column = (i64::from(cell.column) - i64::from(min.column)) as usize;
            board.set(row, column, true);
        }
        Ok(board)
    }

    /// Like [`DenseBoard::from_state`], but an empty state becomes a 0x0 board.
    pub fn from_state_or_empty(state: &BoardState) -> Self {
        Self::from_state(state).unwrap_or_else(|_| Self::dead(0, 0))
    }
}

impl TryFrom<&BoardState> for DenseBoard {
    type Error = EmptyBoardError;

    fn try_from(state: &BoardState) -> Result<Self, Self::Error> {
        Self::from_state(state)
    }
}

/// One line per row: space for dead, `*` for alive.
impl fmt::Display for DenseBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns == 0 {
            return Ok(());
        }
        for row in self.row_slices() {
            for &alive in row {
                f.write_str(if alive { "*" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
