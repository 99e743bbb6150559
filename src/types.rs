//! OpusCheckers - Type definitions and constants
//!
//! This module provides the core type definitions for representing
//! players, pieces, cells and board coordinates.

use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Board dimension (rows and columns)
pub const BOARD_SIZE: usize = 8;

/// Number of rows each side fills at the start of a game
pub const STARTING_ROWS: usize = 3;

/// File and rank names for square notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

/// The two sides of a game.
///
/// `Player1` starts on rows 0-2 and advances towards increasing rows,
/// `Player2` starts on rows 5-7 and advances towards row 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    /// The other side
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Row delta of a forward step for a man of this player
    #[inline]
    pub fn forward(self) -> i32 {
        match self {
            Player::Player1 => 1,
            Player::Player2 => -1,
        }
    }

    /// Row on which a man of this player is crowned
    #[inline]
    pub fn promotion_row(self) -> usize {
        match self {
            Player::Player1 => BOARD_SIZE - 1,
            Player::Player2 => 0,
        }
    }

    /// Index used by the text protocol (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Player::Player1 => 1,
            Player::Player2 => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Player> {
        match n {
            1 => Some(Player::Player1),
            2 => Some(Player::Player2),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// A piece standing on the board. Pieces have no identity beyond the
/// cell they occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub owner: Player,
    pub king: bool,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Piece { owner, king: false }
    }

    pub fn king(owner: Player) -> Self {
        Piece { owner, king: true }
    }

    /// Layout character: `x`/`X` for Player1, `o`/`O` for Player2 (upper case = king)
    pub fn to_char(self) -> char {
        match (self.owner, self.king) {
            (Player::Player1, false) => 'x',
            (Player::Player1, true) => 'X',
            (Player::Player2, false) => 'o',
            (Player::Player2, true) => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        match c {
            'x' => Some(Piece::man(Player::Player1)),
            'X' => Some(Piece::king(Player::Player1)),
            'o' => Some(Piece::man(Player::Player2)),
            'O' => Some(Piece::king(Player::Player2)),
            _ => None,
        }
    }
}

/// Contents of one board cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Piece),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[inline]
    pub fn piece(self) -> Option<Piece> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(piece) => Some(piece),
        }
    }

    /// True if the cell holds a piece owned by `player`
    #[inline]
    pub fn is_owned_by(self, player: Player) -> bool {
        matches!(self, Cell::Occupied(p) if p.owner == player)
    }
}

/// A board coordinate, always in range once constructed.
///
/// Only [`Square::new`], [`Square::parse`] and [`Square::offset`] build one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: usize,
    col: usize,
}

impl Square {
    /// Create a square, rejecting coordinates outside the board
    pub fn new(row: usize, col: usize) -> EngineResult<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Ok(Square { row, col })
        } else {
            Err(EngineError::InvalidCoordinates { row, col })
        }
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col
    }

    /// Square reached by moving `steps` times along `(dr, dc)`, if still on the board
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, steps: i32) -> Option<Square> {
        let row = self.row as i32 + dr * steps;
        let col = self.col as i32 + dc * steps;
        if in_bounds(row, col) {
            Some(Square { row: row as usize, col: col as usize })
        } else {
            None
        }
    }

    /// Playable (dark) cells are the ones where row + col is odd
    #[inline]
    pub fn is_playable(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// Square notation, e.g. (2, 1) -> "b3"
    pub fn name(self) -> String {
        format!("{}{}", FILE_NAMES[self.col] as char, RANK_NAMES[self.row] as char)
    }

    /// Parse square notation ("b3")
    pub fn parse(name: &str) -> EngineResult<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return Err(EngineError::InvalidSquare(name.to_string()));
        }
        let col = match bytes[0] {
            b'a'..=b'h' => (bytes[0] - b'a') as usize,
            _ => return Err(EngineError::InvalidSquare(name.to_string())),
        };
        let row = match bytes[1] {
            b'1'..=b'8' => (bytes[1] - b'1') as usize,
            _ => return Err(EngineError::InvalidSquare(name.to_string())),
        };
        Ok(Square { row, col })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check whether a signed coordinate pair lies on the board
#[inline]
pub fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
