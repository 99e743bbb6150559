//! OpusCheckers - Move Generator Module
//!
//! This module handles the generation of legal checkers moves: diagonal
//! steps, single jumps, and the optional force-jump rule.

use crate::board::{Board, Move};
use crate::error::{EngineError, EngineResult};
use crate::types::*;

/// Diagonal directions for kings, as (row delta, col delta)
pub const KING_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Forward diagonals for a Player1 man
const PLAYER1_DIRECTIONS: [(i32, i32); 2] = [(1, 1), (1, -1)];

/// Forward diagonals for a Player2 man
const PLAYER2_DIRECTIONS: [(i32, i32); 2] = [(-1, 1), (-1, -1)];

/// Movement directions for a piece, determined only by owner and king flag
pub fn move_directions(owner: Player, king: bool) -> &'static [(i32, i32)] {
    if king {
        return &KING_DIRECTIONS;
    }
    match owner {
        Player::Player1 => &PLAYER1_DIRECTIONS,
        Player::Player2 => &PLAYER2_DIRECTIONS,
    }
}

/// A movable piece together with its legal moves
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceMoves {
    pub square: Square,
    pub piece: Piece,
    pub moves: Vec<Move>,
}

impl PieceMoves {
    pub fn has_jump(&self) -> bool {
        self.moves.iter().any(Move::is_jump)
    }
}

/// Move generator for checkers positions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveGenerator {
    /// When set, a side that can capture must capture
    pub force_jump: bool,
}

impl MoveGenerator {
    /// Create a new move generator
    pub fn new(force_jump: bool) -> Self {
        MoveGenerator { force_jump }
    }

    /// Candidate moves of the piece at `(row, col)`.
    ///
    /// Jumps come first, then steps, each in direction-scan order. With the
    /// force-jump rule on, steps are dropped whenever this piece can jump.
    /// Returns an empty list for an empty cell or off-board coordinates.
    pub fn possible_moves(&self, board: &Board, row: usize, col: usize) -> Vec<Move> {
        match Square::new(row, col) {
            Ok(sq) => self.moves_from(board, sq),
            Err(_) => Vec::new(),
        }
    }

    /// Like [`possible_moves`](Self::possible_moves) but rejects off-board coordinates
    pub fn checked_possible_moves(&self, board: &Board, row: usize, col: usize) -> EngineResult<Vec<Move>> {
        let sq = Square::new(row, col)?;
        if board.cell(sq).is_empty() {
            return Err(EngineError::EmptySquare { row, col });
        }
        Ok(self.moves_from(board, sq))
    }

    /// Candidate moves of the piece on `sq`
    pub fn moves_from(&self, board: &Board, sq: Square) -> Vec<Move> {
        let piece = match board.cell(sq).piece() {
            Some(p) => p,
            None => return Vec::new(),
        };

        let mut jumps = Vec::new();
        let mut steps = Vec::new();

        for &(dr, dc) in move_directions(piece.owner, piece.king) {
            let next = match sq.offset(dr, dc, 1) {
                Some(s) => s,
                None => continue,
            };

            match board.cell(next) {
                Cell::Empty => steps.push(Move::step(sq, next)),
                Cell::Occupied(other) if other.owner != piece.owner => {
                    if let Some(landing) = sq.offset(dr, dc, 2) {
                        if board.cell(landing).is_empty() {
                            jumps.push(Move::jump(sq, landing));
                        }
                    }
                }
                Cell::Occupied(_) => {}
            }
        }

        if self.force_jump && !jumps.is_empty() {
            return jumps;
        }
        jumps.extend(steps);
        jumps
    }

    /// Every piece of `player` with at least one legal move, in row-major order.
    ///
    /// Under the force-jump rule, if any piece can jump the list is narrowed
    /// to the jump-capable pieces. All of them are kept (in scan order) rather
    /// than just the first one found.
    pub fn movable_pieces(&self, board: &Board, player: Player) -> Vec<PieceMoves> {
        let mut movable: Vec<PieceMoves> = board
            .pieces(player)
            .filter_map(|(square, piece)| {
                let moves = self.moves_from(board, square);
                if moves.is_empty() {
                    None
                } else {
                    Some(PieceMoves { square, piece, moves })
                }
            })
            .collect();

        if self.force_jump && movable.iter().any(PieceMoves::has_jump) {
            movable.retain(PieceMoves::has_jump);
        }

        movable
    }

    /// All legal moves for `player`, flattened in piece then direction order
    pub fn legal_moves(&self, board: &Board, player: Player) -> Vec<Move> {
        self.movable_pieces(board, player)
            .into_iter()
            .flat_map(|pm| pm.moves)
            .collect()
    }

    /// True if `player` has any legal move
    pub fn has_moves(&self, board: &Board, player: Player) -> bool {
        board
            .pieces(player)
            .any(|(square, _)| !self.moves_from(board, square).is_empty())
    }

    /// Number of destination cells over all of `player`'s pieces, per piece
    /// (no global force-jump narrowing)
    pub fn count_destinations(&self, board: &Board, player: Player) -> usize {
        board
            .pieces(player)
            .map(|(square, _)| self.moves_from(board, square).len())
            .sum()
    }

    /// Count leaf nodes of the legal-move tree to `depth` plies
    pub fn perft(&self, board: &mut Board, player: Player, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.legal_moves(board, player);

        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0u64;
        for mv in moves {
            let undo = board.make_move(&mv);
            nodes += self.perft(board, player.opponent(), depth - 1);
            board.unmake_move(&mv, &undo);
        }

        nodes
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator::new(true)
    }
}
