// Error types shared by the board generator and the game session

use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("board must have at least one column and one row, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },
    #[error("a {cols}x{rows} board is larger than {max_cols}x{max_rows}")]
    TooLarge { cols: usize, rows: usize, max_cols: usize, max_rows: usize },
    #[error("{mines} mines do not fit on a {cols}x{rows} board")]
    TooManyMines { mines: usize, cols: usize, rows: usize },
    #[error("position ({col}, {row}) is outside the board")]
    OutOfBounds { col: usize, row: usize },
}

pub type Result<T> = core::result::Result<T, GameError>;
