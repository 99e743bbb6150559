//! OpusCheckers - Game State Module
//!
//! Composite state layered over the board primitives: whose turn it is,
//! the captured pieces, the move history and the end-of-game status.
//!
//! One call to [`GameState::apply_move`] is one turn. A jump ends the turn
//! even when the landing piece could jump again.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::board::{Board, Move};
use crate::error::{EngineError, EngineResult};
use crate::move_generator::{MoveGenerator, PieceMoves};
use crate::types::*;

/// Result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win(Player),
    Draw,
}

/// A piece removed from the board, with the cell it was taken on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapturedPiece {
    pub square: Square,
    pub piece: Piece,
}

/// What a single applied move did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub mv: Move,
    pub captured: Option<CapturedPiece>,
    pub promoted: bool,
    /// Side to move after this move
    pub turn: Player,
    pub outcome: Option<Outcome>,
}

/// Full state of one game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    turn: Player,
    generator: MoveGenerator,
    captured: Vec<CapturedPiece>,
    history: Vec<Move>,
    outcome: Option<Outcome>,
}

impl GameState {
    /// Start a new game from the standard layout
    pub fn new_game(starting_player: Player, force_jump: bool) -> Self {
        GameState {
            board: Board::new(),
            turn: starting_player,
            generator: MoveGenerator::new(force_jump),
            captured: Vec::new(),
            history: Vec::new(),
            outcome: None,
        }
    }

    /// Set up a game from an arbitrary board.
    ///
    /// If the side to move has no legal move the game is already over: the
    /// opponent wins if it can still move, otherwise it is a draw.
    pub fn from_board(board: Board, turn: Player, force_jump: bool) -> Self {
        let generator = MoveGenerator::new(force_jump);
        let outcome = if generator.has_moves(&board, turn) {
            None
        } else if generator.has_moves(&board, turn.opponent()) {
            Some(Outcome::Win(turn.opponent()))
        } else {
            Some(Outcome::Draw)
        };

        GameState {
            board,
            turn,
            generator,
            captured: Vec::new(),
            history: Vec::new(),
            outcome,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn generator(&self) -> &MoveGenerator {
        &self.generator
    }

    pub fn force_jump(&self) -> bool {
        self.generator.force_jump
    }

    /// Pieces captured so far, oldest first
    pub fn captured(&self) -> &[CapturedPiece] {
        &self.captured
    }

    /// Moves applied so far
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Number of moves played
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn is_end(&self) -> bool {
        self.outcome.is_some()
    }

    /// `None` while the game is in progress
    pub fn winner(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Candidate moves of the piece at `(row, col)`, ignoring whose turn it is
    pub fn possible_moves(&self, row: usize, col: usize) -> Vec<Move> {
        self.generator.possible_moves(&self.board, row, col)
    }

    /// Movable pieces for the side to move
    pub fn movable_pieces(&self) -> Vec<PieceMoves> {
        if self.is_end() {
            return Vec::new();
        }
        self.generator.movable_pieces(&self.board, self.turn)
    }

    /// All legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_end() {
            return Vec::new();
        }
        self.generator.legal_moves(&self.board, self.turn)
    }

    /// Apply one move for the side to move.
    ///
    /// The move must be one of the moves [`movable_pieces`](Self::movable_pieces)
    /// offers, so the force-jump rule applies across all of the mover's pieces.
    /// On error the state is left unchanged.
    pub fn apply_move(&mut self, from: Square, to: Square) -> EngineResult<MoveReport> {
        if self.is_end() {
            return Err(EngineError::GameOver);
        }

        let piece = self.board.cell(from).piece().ok_or(EngineError::EmptySquare {
            row: from.row(),
            col: from.col(),
        })?;
        if piece.owner != self.turn {
            return Err(EngineError::NotYourPiece { row: from.row(), col: from.col() });
        }

        let mv = self
            .legal_moves()
            .into_iter()
            .find(|m| m.from == from && m.to == to)
            .ok_or(EngineError::IllegalMove { from, to })?;

        Ok(self.play(mv))
    }

    /// Apply a move already known to be legal
    fn play(&mut self, mv: Move) -> MoveReport {
        let mover = self.turn;
        let undo = self.board.make_move(&mv);
        let promoted = undo.promoted(&self.board, &mv);

        let captured = match (mv.captured_square(), undo.captured_piece) {
            (Some(square), Some(piece)) => {
                let c = CapturedPiece { square, piece };
                self.captured.push(c);
                Some(c)
            }
            _ => None,
        };

        self.history.push(mv);
        self.turn = mover.opponent();

        if !self.generator.has_moves(&self.board, self.turn) {
            self.outcome = if self.generator.has_moves(&self.board, mover) {
                Some(Outcome::Win(mover))
            } else {
                Some(Outcome::Draw)
            };
            info!(ply = self.ply(), outcome = ?self.outcome, "game over");
        }

        debug!(mv = %mv, captured = captured.is_some(), promoted, "move applied");

        MoveReport {
            mv,
            captured,
            promoted,
            turn: self.turn,
            outcome: self.outcome,
        }
    }

    /// Play `plies` uniformly random legal moves from the starting position,
    /// stopping early if the game ends. Deterministic for a given seed.
    pub fn random_playout(seed: u64, plies: usize, force_jump: bool) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new_game(Player::Player1, force_jump);

        for _ in 0..plies {
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            game.play(mv);
        }

        game
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new_game(Player::Player1, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn opening_step_passes_turn() {
        let mut game = GameState::new_game(Player::Player1, true);
        let report = game.apply_move(sq(2, 1), sq(3, 0)).unwrap();
        assert!(game.board().cell(sq(2, 1)).is_empty());
        assert_eq!(game.board().cell(sq(3, 0)), Cell::Occupied(Piece::man(Player::Player1)));
        assert_eq!(report.turn, Player::Player2);
        assert_eq!(game.turn(), Player::Player2);
        assert!(report.captured.is_none());
        assert!(!game.is_end());
        assert_eq!(game.ply(), 1);
    }

    #[test]
    fn illegal_move_leaves_state_untouched() {
        let mut game = GameState::new_game(Player::Player1, true);
        let before = game.clone();

        assert_eq!(
            game.apply_move(sq(2, 1), sq(4, 3)),
            Err(EngineError::IllegalMove { from: sq(2, 1), to: sq(4, 3) })
        );
        assert_eq!(
            game.apply_move(sq(5, 0), sq(4, 1)),
            Err(EngineError::NotYourPiece { row: 5, col: 0 })
        );
        assert_eq!(
            game.apply_move(sq(3, 0), sq(4, 1)),
            Err(EngineError::EmptySquare { row: 3, col: 0 })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn forced_jump_rejects_step_of_another_piece() {
        let board = Board::from_layout(
            "......../......../.x...x../..o...../......../......../......../o.......",
        )
        .unwrap();
        let mut game = GameState::from_board(board, Player::Player1, true);
        assert!(matches!(
            game.apply_move(sq(2, 5), sq(3, 6)),
            Err(EngineError::IllegalMove { .. })
        ));
        let report = game.apply_move(sq(2, 1), sq(4, 3)).unwrap();
        assert_eq!(
            report.captured,
            Some(CapturedPiece { square: sq(3, 2), piece: Piece::man(Player::Player2) })
        );
        assert_eq!(game.captured().len(), 1);
    }

    #[test]
    fn capturing_last_piece_wins() {
        let board = Board::from_layout(
            "......../......../.x....../..o...../......../......../......../........",
        )
        .unwrap();
        let mut game = GameState::from_board(board, Player::Player1, true);
        let report = game.apply_move(sq(2, 1), sq(4, 3)).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Win(Player::Player1)));
        assert!(game.is_end());
        assert_eq!(game.winner(), Some(Outcome::Win(Player::Player1)));
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.apply_move(sq(4, 3), sq(5, 4)), Err(EngineError::GameOver));
    }

    #[test]
    fn both_sides_stuck_is_a_draw() {
        // Player1's men on the last row are immobile; the man on (5,0) walks
        // into the pocket between them. Player2's man on row 0 cannot advance.
        let board = Board::from_layout(
            ".o....../......../......../......../......../x......./......../x.x.....",
        )
        .unwrap();
        let mut game = GameState::from_board(board, Player::Player1, true);
        assert!(!game.is_end());

        let report = game.apply_move(sq(5, 0), sq(6, 1)).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Draw));
        assert_eq!(game.winner(), Some(Outcome::Draw));
    }

    #[test]
    fn side_without_moves_at_setup_loses() {
        let board = Board::from_layout(
            "......../......../......../......../......../......../......../o.....x.",
        )
        .unwrap();
        // Player1's man on row 7 has nowhere to go; Player2's man can advance.
        let game = GameState::from_board(board, Player::Player1, true);
        assert!(game.is_end());
        assert_eq!(game.winner(), Some(Outcome::Win(Player::Player2)));
        assert!(game.movable_pieces().is_empty());
    }

    #[test]
    fn random_playout_is_deterministic() {
        let a = GameState::random_playout(7, 30, true);
        let b = GameState::random_playout(7, 30, true);
        assert_eq!(a, b);
        assert!(a.ply() <= 30);
    }
}
