//! The 4x4 grid and its locked-cell set.

use super::action::MoveError;
use super::types::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cells per row and per column.
pub const SIDE: usize = 4;

/// Cells on the board.
pub const CELL_COUNT: usize = SIDE * SIDE;

/// Contents of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing placed yet.
    Empty,
    /// A card of `rank` placed by `owner`.
    Occupied {
        /// Rank of the card on top.
        rank: u8,
        /// Color of the card on top.
        owner: Color,
    },
}

impl Cell {
    /// Owner of the cell, if occupied.
    pub fn owner(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Occupied { owner, .. } => Some(owner),
        }
    }

    /// Rank on the cell, if occupied.
    pub fn rank(self) -> Option<u8> {
        match self {
            Cell::Empty => None,
            Cell::Occupied { rank, .. } => Some(rank),
        }
    }

    /// Returns true for [`Cell::Empty`].
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Board state: sixteen cells in row-major order plus the locked indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
    locked: BTreeSet<usize>,
}

impl Board {
    /// Creates an empty, unlocked board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
            locked: BTreeSet::new(),
        }
    }

    /// Gets the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Overwrites the cell at `index` without any rule checks.
    pub fn set(&mut self, index: usize, cell: Cell) -> Result<(), MoveError> {
        let slot = self.cells.get_mut(index).ok_or(MoveError::OutOfBounds(index))?;
        *slot = cell;
        Ok(())
    }

    /// Adds `index` to the locked set.
    pub fn lock(&mut self, index: usize) -> Result<(), MoveError> {
        if index >= CELL_COUNT {
            return Err(MoveError::OutOfBounds(index));
        }
        self.locked.insert(index);
        Ok(())
    }

    /// Returns true if `index` has been overwritten and is now frozen.
    pub fn is_locked(&self, index: usize) -> bool {
        self.locked.contains(&index)
    }

    /// Locked indices in ascending order.
    pub fn locked(&self) -> impl Iterator<Item = usize> + '_ {
        self.locked.iter().copied()
    }

    /// Returns true if the cell at `index` is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Returns true when every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.occupied_count() == CELL_COUNT
    }

    /// Formats the board for a terminal.
    ///
    /// Empty cells show their index, occupied cells `G3`/`R5`, and a
    /// trailing `*` marks a locked cell.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..SIDE {
            for col in 0..SIDE {
                let index = row * SIDE + col;
                let symbol = match self.cells[index] {
                    Cell::Empty => format!("{:>2} ", index),
                    Cell::Occupied { rank, owner } => {
                        let tag = match owner {
                            Color::Green => 'G',
                            Color::Red => 'R',
                        };
                        let lock = if self.is_locked(index) { '*' } else { ' ' };
                        format!("{}{}{}", tag, rank, lock)
                    }
                };
                result.push_str(&symbol);
                if col < SIDE - 1 {
                    result.push('|');
                }
            }
            if row < SIDE - 1 {
                result.push_str("\n---+---+---+---\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
