//! Connect 4 board model for the fourplay engine
//!
//! Connect 4 is a two-player connection game where players drop colored discs
//! into a 7-column, 6-row vertically suspended grid. The objective is to be
//! the first to form a horizontal, vertical, or diagonal line of four discs.
//!
//! # Board Layout
//!
//! The board is stored as a row-major grid with row 0 at the top, which is the
//! encoding accepted at the engine boundary. Pieces fall to the highest row
//! index that is still empty:
//! ```text
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Top (a column is legal iff this cell is empty)
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 4: [28][29][30][31][32][33][34]
//! Row 5: [35][36][37][38][39][40][41]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! Cell values are `0` (empty), `+1` (Red, moves first) and `-1` (Yellow).
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::{Board, Player};
//!
//! let mut board = Board::new();
//! let row = board.apply_move(3, Player::Red).unwrap();
//! assert_eq!(row, 5);
//! assert!(!board.detect_win(row, 3, Player::Red));
//! assert_eq!(board.to_move(), Player::Yellow);
//! ```

use std::fmt;

use thiserror::Error;

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Column preferred by the opening shortcut and the rollout policy.
pub const CENTER_COLUMN: u8 = (COLS / 2) as u8;

/// Value of an unoccupied cell.
pub const EMPTY: i8 = 0;

/// Line directions as (row delta, column delta): horizontal, vertical, both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Errors raised by board operations and boundary decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("column {0} is out of range (board has {COLS} columns)")]
    ColumnOutOfRange(u8),

    #[error("illegal move: column {0} is full")]
    ColumnFull(u8),

    #[error("invalid cell value {value} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, value: i8 },

    #[error("piece at row {row}, column {col} has an empty cell below it")]
    FloatingPiece { row: usize, col: usize },

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid board symbol {0:?}")]
    InvalidSymbol(char),
}

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Player A, cell value +1, moves first. Rendered as `X`.
    Red,
    /// Player B, cell value -1. Rendered as `O`.
    Yellow,
}

impl Player {
    /// Cell value written to the grid for this player.
    #[inline]
    pub fn cell(self) -> i8 {
        match self {
            Player::Red => 1,
            Player::Yellow => -1,
        }
    }

    /// Player owning a cell value, `None` for empty (or invalid) cells.
    #[inline]
    pub fn from_cell(value: i8) -> Option<Player> {
        match value {
            1 => Some(Player::Red),
            -1 => Some(Player::Yellow),
            _ => None,
        }
    }

    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Red => Player::Yellow,
            Player::Yellow => Player::Red,
        }
    }

    /// Console symbol.
    pub fn symbol(self) -> char {
        match self {
            Player::Red => 'X',
            Player::Yellow => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => write!(f, "Red"),
            Player::Yellow => write!(f, "Yellow"),
        }
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win(Player),
    Draw,
}

impl Outcome {
    /// Winning player, `None` for a draw.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(player),
            Outcome::Draw => None,
        }
    }
}

/// Connect4 position
///
/// A plain 6x7 grid. The board does not track whose turn it is; callers pass the
/// player explicitly, and [`Board::to_move`] infers it from piece counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[i8; COLS]; ROWS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: [[EMPTY; COLS]; ROWS],
        }
    }

    /// Build a board from the boundary encoding (row 0 = top, values in {0, +1, -1}).
    ///
    /// Rejects unknown cell values and pieces that float above an empty cell.
    pub fn from_rows(rows: [[i8; COLS]; ROWS]) -> Result<Self, BoardError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value != EMPTY && Player::from_cell(value).is_none() {
                    return Err(BoardError::InvalidCell { row, col, value });
                }
            }
        }

        for col in 0..COLS {
            let mut seen_empty = false;
            for row in (0..ROWS).rev() {
                if rows[row][col] == EMPTY {
                    seen_empty = true;
                } else if seen_empty {
                    return Err(BoardError::FloatingPiece { row, col });
                }
            }
        }

        Ok(Self { cells: rows })
    }

    /// Raw grid, row 0 at the top.
    pub fn rows(&self) -> &[[i8; COLS]; ROWS] {
        &self.cells
    }

    /// Cell value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[row][col]
    }

    /// True if no piece has been played.
    pub fn is_empty(&self) -> bool {
        self.cells[ROWS - 1].iter().all(|&cell| cell == EMPTY)
    }

    /// Number of pieces `player` has on the board.
    pub fn piece_count(&self, player: Player) -> usize {
        let value = player.cell();
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell == value)
            .count()
    }

    /// Player to move, assuming strict alternation from an empty board with Red first.
    pub fn to_move(&self) -> Player {
        if self.piece_count(Player::Red) <= self.piece_count(Player::Yellow) {
            Player::Red
        } else {
            Player::Yellow
        }
    }

    /// Whether a piece can be dropped in `column`.
    #[inline]
    pub fn is_legal(&self, column: u8) -> bool {
        (column as usize) < COLS && self.cells[0][column as usize] == EMPTY
    }

    /// Legal columns in ascending order.
    ///
    /// This order is the tie-break order used wherever a deterministic choice is needed.
    pub fn legal_actions(&self) -> Vec<u8> {
        (0..COLS as u8).filter(|&col| self.is_legal(col)).collect()
    }

    /// Row a piece dropped in `column` would land on, `None` if the column is full.
    pub fn landing_row(&self, column: u8) -> Option<usize> {
        let col = column as usize;
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col] == EMPTY)
    }

    /// Drop a piece for `player` in `column` and return the row it landed on.
    ///
    /// Callers are expected to pick `column` from [`Board::legal_actions`]; a full
    /// or out-of-range column is reported as an error and leaves the board untouched.
    pub fn apply_move(&mut self, column: u8, player: Player) -> Result<usize, BoardError> {
        if column as usize >= COLS {
            return Err(BoardError::ColumnOutOfRange(column));
        }
        let row = self
            .landing_row(column)
            .ok_or(BoardError::ColumnFull(column))?;
        self.cells[row][column as usize] = player.cell();
        Ok(row)
    }

    /// Check whether the piece at (row, col) belongs to `player` and completes a line of four.
    ///
    /// Counts contiguous cells of `player` extending both ways from (row, col) in each
    /// of the four directions, so the result does not depend on which cell of the
    /// line was placed last.
    pub fn detect_win(&self, row: usize, col: usize, player: Player) -> bool {
        if row >= ROWS || col >= COLS {
            return false;
        }
        let value = player.cell();
        if self.cells[row][col] != value {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let count = 1 + self.run_length(row, col, dr, dc, value)
                + self.run_length(row, col, -dr, -dc, value);
            count >= 4
        })
    }

    /// Number of consecutive `value` cells starting one step away from (row, col).
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, value: i8) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while r >= 0
            && r < ROWS as isize
            && c >= 0
            && c < COLS as isize
            && self.cells[r as usize][c as usize] == value
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// True iff every column is full.
    pub fn is_draw(&self) -> bool {
        self.cells[0].iter().all(|&cell| cell != EMPTY)
    }

    /// Would dropping a piece for `player` in `column` win immediately?
    ///
    /// Evaluated on a scratch copy, so `self` is never modified. Illegal columns
    /// never win.
    pub fn would_win(&self, column: u8, player: Player) -> bool {
        let mut scratch = *self;
        match scratch.apply_move(column, player) {
            Ok(row) => scratch.detect_win(row, column as usize, player),
            Err(_) => false,
        }
    }

    /// Lowest-index legal column that wins immediately for `player`.
    pub fn winning_column(&self, player: Player) -> Option<u8> {
        (0..COLS as u8).find(|&col| self.is_legal(col) && self.would_win(col, player))
    }

    /// Classify an arbitrary board: a four-in-a-row anywhere, a full board, or `None`.
    pub fn outcome(&self) -> Option<Outcome> {
        for row in 0..ROWS {
            for col in 0..COLS {
                if let Some(player) = Player::from_cell(self.cells[row][col]) {
                    if self.detect_win(row, col, player) {
                        return Some(Outcome::Win(player));
                    }
                }
            }
        }

        if self.is_draw() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Canonical position key: 42 symbols in row-major order from the top.
    ///
    /// `.` is empty, `X` is Red and `O` is Yellow.
    pub fn to_key(&self) -> String {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(|&cell| match Player::from_cell(cell) {
                Some(player) => player.symbol(),
                None => '.',
            })
            .collect()
    }

    /// Decode a key produced by [`Board::to_key`].
    pub fn from_key(key: &str) -> Result<Self, BoardError> {
        let symbols: Vec<char> = key.chars().collect();
        if symbols.len() != BOARD_SIZE {
            return Err(BoardError::InvalidLength {
                expected: BOARD_SIZE,
                actual: symbols.len(),
            });
        }

        let mut rows = [[EMPTY; COLS]; ROWS];
        for (i, symbol) in symbols.into_iter().enumerate() {
            rows[i / COLS][i % COLS] = match symbol {
                '.' => EMPTY,
                'X' => Player::Red.cell(),
                'O' => Player::Yellow.cell(),
                other => return Err(BoardError::InvalidSymbol(other)),
            };
        }

        Self::from_rows(rows)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|&cell| match Player::from_cell(cell) {
                    Some(player) => player.symbol().to_string(),
                    None => "+".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        let footer: Vec<String> = (0..COLS).map(|col| col.to_string()).collect();
        write!(f, "{}", footer.join(" "))
    }
}
