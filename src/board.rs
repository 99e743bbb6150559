//! OpusCheckers - Board Representation Module
//!
//! This module provides the core data structures for representing a checkers
//! board and moves. It includes layout-string parsing and generation and
//! reversible move execution.

use std::fmt;

use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::types::*;

/// Starting position layout (row 0 first, rows separated by '/')
pub const STARTING_LAYOUT: &str =
    ".x.x.x.x/x.x.x.x./.x.x.x.x/......../......../o.o.o.o./.o.o.o.o/o.o.o.o.";

/// Distinguishes a one-cell diagonal step from a capturing jump
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Step,
    Jump,
}

/// Represents a checkers move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    /// Create a simple diagonal step
    pub fn step(from: Square, to: Square) -> Self {
        Move { from, to, kind: MoveKind::Step }
    }

    /// Create a jump over the midpoint square
    pub fn jump(from: Square, to: Square) -> Self {
        Move { from, to, kind: MoveKind::Jump }
    }

    #[inline]
    pub fn is_jump(&self) -> bool {
        self.kind == MoveKind::Jump
    }

    /// Square of the piece removed by this move, if it is a jump
    #[inline]
    pub fn captured_square(&self) -> Option<Square> {
        match self.kind {
            MoveKind::Step => None,
            MoveKind::Jump => Square::new(
                (self.from.row() + self.to.row()) / 2,
                (self.from.col() + self.to.col()) / 2,
            )
            .ok(),
        }
    }

    /// Move notation: "b3-a4" for steps, "b3xd5" for jumps
    pub fn to_notation(&self) -> String {
        let sep = if self.is_jump() { 'x' } else { '-' };
        format!("{}{}{}", self.from.name(), sep, self.to.name())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

/// Information needed to undo a move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndoInfo {
    /// `None` if the origin was empty and the board was left alone
    pub moved_piece: Option<Piece>,
    pub captured_piece: Option<Piece>,
}

impl UndoInfo {
    /// True if the move crowned the moving piece
    pub fn promoted(&self, board: &Board, mv: &Move) -> bool {
        self.moved_piece.map_or(false, |p| !p.king)
            && board.cell(mv.to).piece().map_or(false, |p| p.king)
    }
}

/// Checkers board representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    /// 8x8 grid indexed `[row][col]`
    pub cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Create a board with the starting position
    pub fn new() -> Self {
        let mut board = Board::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if (row + col) % 2 == 0 {
                    continue;
                }
                if row < STARTING_ROWS {
                    board.cells[row][col] = Cell::Occupied(Piece::man(Player::Player1));
                } else if row >= BOARD_SIZE - STARTING_ROWS {
                    board.cells[row][col] = Cell::Occupied(Piece::man(Player::Player2));
                }
            }
        }
        board
    }

    /// Create a board with no pieces
    pub fn empty() -> Self {
        Board { cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE] }
    }

    /// Create a board from a layout string.
    ///
    /// Eight rows of eight characters separated by '/', row 0 first.
    /// `.` is empty, `x`/`X` a Player1 man/king, `o`/`O` a Player2 man/king.
    /// Pieces on light (even) cells are rejected.
    pub fn from_layout(layout: &str) -> EngineResult<Self> {
        let rows: Vec<&str> = layout.trim().split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(EngineError::InvalidLayout(format!(
                "expected {} rows, found {}",
                BOARD_SIZE,
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, text) in rows.iter().enumerate() {
            let chars: Vec<char> = text.chars().collect();
            if chars.len() != BOARD_SIZE {
                return Err(EngineError::InvalidLayout(format!(
                    "row {} has {} cells",
                    row,
                    chars.len()
                )));
            }
            for (col, &c) in chars.iter().enumerate() {
                if c == '.' {
                    continue;
                }
                let piece = Piece::from_char(c).ok_or_else(|| {
                    EngineError::InvalidLayout(format!("unknown piece '{}' at ({}, {})", c, row, col))
                })?;
                if (row + col) % 2 == 0 {
                    return Err(EngineError::InvalidLayout(format!(
                        "piece on unplayable cell ({}, {})",
                        row, col
                    )));
                }
                board.cells[row][col] = Cell::Occupied(piece);
            }
        }

        Ok(board)
    }

    /// Generate the layout string for this board
    pub fn to_layout(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.piece().map(Piece::to_char).unwrap_or('.'))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Bounds-checked cell lookup
    pub fn get(&self, row: usize, col: usize) -> EngineResult<Cell> {
        let sq = Square::new(row, col)?;
        Ok(self.cell(sq))
    }

    #[inline]
    pub fn cell(&self, sq: Square) -> Cell {
        self.cells[sq.row()][sq.col()]
    }

    /// Place a piece during setup. Only playable cells are accepted.
    pub fn place(&mut self, sq: Square, piece: Piece) -> EngineResult<()> {
        if !sq.is_playable() {
            return Err(EngineError::InvalidLayout(format!(
                "piece on unplayable cell ({}, {})",
                sq.row(),
                sq.col()
            )));
        }
        self.cells[sq.row()][sq.col()] = Cell::Occupied(piece);
        Ok(())
    }

    pub fn clear(&mut self, sq: Square) {
        self.cells[sq.row()][sq.col()] = Cell::Empty;
    }

    /// Squares occupied by `player`, in row-major order
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..BOARD_SIZE).flat_map(move |row| {
            (0..BOARD_SIZE).filter_map(move |col| match self.cells[row][col] {
                Cell::Occupied(p) if p.owner == player => Square::new(row, col).ok().map(|sq| (sq, p)),
                _ => None,
            })
        })
    }

    /// Count (men, kings) for the given player
    pub fn count_pieces(&self, player: Player) -> (usize, usize) {
        self.pieces(player).fold((0, 0), |(men, kings), (_, p)| {
            if p.king {
                (men, kings + 1)
            } else {
                (men + 1, kings)
            }
        })
    }

    /// Execute a move on the board. Returns UndoInfo for undoing the move later.
    ///
    /// The move is not validated; callers obtain it from the move generator.
    /// A move from an empty square leaves the board untouched.
    pub fn make_move(&mut self, mv: &Move) -> UndoInfo {
        let moved_piece = match self.cell(mv.from).piece() {
            Some(p) => p,
            None => {
                warn!(mv = %mv, "move from empty square ignored");
                return UndoInfo { moved_piece: None, captured_piece: None };
            }
        };

        let captured_piece = mv.captured_square().and_then(|sq| {
            let captured = self.cell(sq).piece();
            self.clear(sq);
            captured
        });

        let crowned = moved_piece.king || mv.to.row() == moved_piece.owner.promotion_row();
        self.clear(mv.from);
        self.cells[mv.to.row()][mv.to.col()] = Cell::Occupied(Piece {
            owner: moved_piece.owner,
            king: crowned,
        });

        UndoInfo { moved_piece: Some(moved_piece), captured_piece }
    }

    /// Undo a move using saved UndoInfo
    pub fn unmake_move(&mut self, mv: &Move, undo: &UndoInfo) {
        let moved_piece = match undo.moved_piece {
            Some(p) => p,
            None => return,
        };
        self.clear(mv.to);
        self.cells[mv.from.row()][mv.from.col()] = Cell::Occupied(moved_piece);
        if let (Some(sq), Some(piece)) = (mv.captured_square(), undo.captured_piece) {
            self.cells[sq.row()][sq.col()] = Cell::Occupied(piece);
        }
    }

    /// Display the board as a string, highest row at the top
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        lines.push("  +---+---+---+---+---+---+---+---+".to_string());

        for row in (0..BOARD_SIZE).rev() {
            let mut line = format!("{} |", row + 1);
            for col in 0..BOARD_SIZE {
                match self.cells[row][col] {
                    Cell::Empty => line.push_str("   |"),
                    Cell::Occupied(p) => line.push_str(&format!(" {} |", p.to_char())),
                }
            }
            lines.push(line);
            lines.push("  +---+---+---+---+---+---+---+---+".to_string());
        }
        lines.push("    a   b   c   d   e   f   g   h".to_string());

        lines.join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
