// Minefield generation and neighbour lookup
// Builds the fixed mine/hint layout a single game is played on

use std::ops::Index;

use clap::ValueEnum;
use rand::Rng;
use rand::seq::index;
use serde::Deserialize;
use tracing::debug;

use crate::tsw_error::{GameError, Result};

/// Largest board the terminal can lay out (two columns per cell)
pub const MAX_COLS: usize = 64;
pub const MAX_ROWS: usize = 40;

/// Board coordinate, zero-based column then row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub col: usize,
    pub row: usize,
}

impl Pos {
    pub const fn new(col: usize, row: usize) -> Self {
        Pos { col, row }
    }
}

/// What a cell holds; set once when the board is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Mine,
    Hint(u8), // Number of mines among the up-to-8 neighbours
}

/// A single square of the minefield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub pos: Pos,
    pub content: Content,
    pub revealed: bool,
    pub flagged: bool, // Never set together with `revealed`
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        matches!(self.content, Content::Mine)
    }

    /// Hint number of a safe cell, `None` for a mine
    pub fn hint(&self) -> Option<u8> {
        match self.content {
            Content::Mine => None,
            Content::Hint(n) => Some(n),
        }
    }
}

/// Strategy used to scatter mines over a fresh board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Cycle over the board in row-major order, dropping a mine on each free
    /// cell with probability `mines / cells` until the quota is met
    #[default]
    Scan,
    /// Uniform sample of distinct cells
    Uniform,
}

/// Rectangular minefield, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    mines: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Generate a random minefield with exactly `mines` mines
    ///
    /// The configuration is checked before any randomness is consumed: the
    /// board must fit within [`MAX_COLS`]x[`MAX_ROWS`] and at least one cell
    /// must stay safe.
    pub fn generate<R: Rng + ?Sized>(
        mines: usize,
        cols: usize,
        rows: usize,
        placement: Placement,
        rng: &mut R,
    ) -> Result<Grid> {
        validate(mines, cols, rows)?;
        let total = cols * rows;
        let mut mask = vec![false; total];
        match placement {
            Placement::Scan => scan_fill(&mut mask, mines, rng),
            Placement::Uniform => {
                for i in index::sample(rng, total, mines) {
                    mask[i] = true;
                }
            }
        }
        debug!(mines, cols, rows, ?placement, "generated minefield");
        Ok(Grid::from_mask(cols, rows, mask))
    }

    /// Build a minefield from an explicit list of mine positions
    /// Duplicate positions count once
    pub fn from_mines(cols: usize, rows: usize, mines: &[Pos]) -> Result<Grid> {
        validate_size(cols, rows)?;
        let mut mask = vec![false; cols * rows];
        for &Pos { col, row } in mines {
            if col >= cols || row >= rows {
                return Err(GameError::OutOfBounds { col, row });
            }
            mask[row * cols + col] = true;
        }
        let placed = mask.iter().filter(|m| **m).count();
        validate(placed, cols, rows)?;
        Ok(Grid::from_mask(cols, rows, mask))
    }

    fn from_mask(cols: usize, rows: usize, mask: Vec<bool>) -> Grid {
        let mines = mask.iter().filter(|m| **m).count();
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Pos::new(col, row)))
            .map(|pos| {
                let content = if mask[pos.row * cols + pos.col] {
                    Content::Mine
                } else {
                    let n = neighbors_in(cols, rows, pos)
                        .into_iter()
                        .filter(|p| mask[p.row * cols + p.col])
                        .count();
                    Content::Hint(n as u8)
                };
                Cell {
                    pos,
                    content,
                    revealed: false,
                    flagged: false,
                }
            })
            .collect();
        Grid {
            cols,
            rows,
            mines,
            cells,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    /// Number of cells that have to be revealed to win
    pub fn safe_count(&self) -> usize {
        self.cols * self.rows - self.mines
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.col < self.cols && pos.row < self.rows
    }

    /// Up to 8 positions around `pos`, clipped to the board
    ///
    /// Panics if `pos` itself is outside the board.
    pub fn neighbors(&self, pos: Pos) -> Vec<Pos> {
        self.offset(pos);
        neighbors_in(self.cols, self.rows, pos)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        let i = self.offset(pos);
        &mut self.cells[i]
    }

    fn offset(&self, pos: Pos) -> usize {
        assert!(
            self.contains(pos),
            "position ({}, {}) is outside the {}x{} board",
            pos.col,
            pos.row,
            self.cols,
            self.rows
        );
        pos.row * self.cols + pos.col
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Cell {
        &self.cells[self.offset(pos)]
    }
}

fn validate_size(cols: usize, rows: usize) -> Result<usize> {
    if cols == 0 || rows == 0 {
        return Err(GameError::InvalidDimensions { cols, rows });
    }
    let too_large = GameError::TooLarge {
        cols,
        rows,
        max_cols: MAX_COLS,
        max_rows: MAX_ROWS,
    };
    if cols > MAX_COLS || rows > MAX_ROWS {
        return Err(too_large);
    }
    cols.checked_mul(rows).ok_or(too_large)
}

fn validate(mines: usize, cols: usize, rows: usize) -> Result<()> {
    if mines >= validate_size(cols, rows)? {
        return Err(GameError::TooManyMines { mines, cols, rows });
    }
    Ok(())
}

// Revisits the board in a fixed cyclic order, so the distribution is biased
// towards early cells. Each placement shrinks `remaining`, which bounds the
// loop almost surely.
fn scan_fill<R: Rng + ?Sized>(mask: &mut [bool], mines: usize, rng: &mut R) {
    let probability = mines as f64 / mask.len() as f64;
    let mut remaining = mines;
    let mut i = 0;
    while remaining > 0 {
        if !mask[i] && rng.gen_bool(probability) {
            mask[i] = true;
            remaining -= 1;
        }
        i = (i + 1) % mask.len();
    }
}

fn neighbors_in(cols: usize, rows: usize, pos: Pos) -> Vec<Pos> {
    let mut out = Vec::with_capacity(8);
    for row in pos.row.saturating_sub(1)..=(pos.row + 1).min(rows - 1) {
        for col in pos.col.saturating_sub(1)..=(pos.col + 1).min(cols - 1) {
            if col == pos.col && row == pos.row {
                continue;
            }
            out.push(Pos::new(col, row));
        }
    }
    out
}
