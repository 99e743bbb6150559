//! OpusCheckers - Position Evaluation Module
//!
//! This module provides static evaluation of checkers positions considering:
//! - Material balance (men and kings)
//! - Mobility (destination cells available)
//! - Centre control
//! - Pieces left en prise to an immediate jump
//!
//! Weights are passed in explicitly so searches with different tunings stay
//! reproducible.

use crate::board::Board;
use crate::move_generator::{move_directions, MoveGenerator, KING_DIRECTIONS};
use crate::types::*;

/// Rows and columns that make up the board centre
pub const CENTER_LINES: [usize; 2] = [3, 4];

/// Tunable evaluation weights
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalWeights {
    pub man: i32,
    pub king: i32,
    pub mobility: i32,
    pub center: i32,
    pub threat: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            man: 3,
            king: 5,
            mobility: 1,
            center: 2,
            threat: 2,
        }
    }
}

/// Per-side feature counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SideFeatures {
    pub men: i32,
    pub kings: i32,
    pub mobility: i32,
    pub center: i32,
    pub threatened: i32,
}

impl SideFeatures {
    /// Weighted score of these features
    pub fn score(&self, weights: &EvalWeights) -> i32 {
        self.men * weights.man
            + self.kings * weights.king
            + self.mobility * weights.mobility
            + self.center * weights.center
            - self.threatened * weights.threat
    }
}

/// True if the cell lies in the two centre rows and two centre columns
#[inline]
fn is_center(sq: Square) -> bool {
    CENTER_LINES.contains(&sq.row()) && CENTER_LINES.contains(&sq.col())
}

/// True if an opponent piece could jump the piece on `sq` right now:
/// an enemy sits diagonally adjacent, may move towards `sq`, and the cell
/// beyond `sq` on that diagonal is empty.
pub fn is_threatened(board: &Board, sq: Square) -> bool {
    let piece = match board.cell(sq).piece() {
        Some(p) => p,
        None => return false,
    };

    for &(dr, dc) in &KING_DIRECTIONS {
        let attacker_sq = match sq.offset(dr, dc, 1) {
            Some(s) => s,
            None => continue,
        };
        let attacker = match board.cell(attacker_sq).piece() {
            Some(a) if a.owner != piece.owner => a,
            _ => continue,
        };
        if !move_directions(attacker.owner, attacker.king).contains(&(-dr, -dc)) {
            continue;
        }
        if let Some(landing) = sq.offset(-dr, -dc, 1) {
            if board.cell(landing).is_empty() {
                return true;
            }
        }
    }

    false
}

/// Collect feature counts for one side
pub fn side_features(board: &Board, player: Player, generator: &MoveGenerator) -> SideFeatures {
    let mut features = SideFeatures::default();

    for (sq, piece) in board.pieces(player) {
        if piece.king {
            features.kings += 1;
        } else {
            features.men += 1;
        }
        features.mobility += generator.moves_from(board, sq).len() as i32;
        if is_center(sq) {
            features.center += 1;
        }
        if is_threatened(board, sq) {
            features.threatened += 1;
        }
    }

    features
}

/// Evaluate the position from `perspective`'s point of view
/// (positive = `perspective` is better)
pub fn evaluate(board: &Board, perspective: Player, weights: &EvalWeights, generator: &MoveGenerator) -> i32 {
    let own = side_features(board, perspective, generator).score(weights);
    let other = side_features(board, perspective.opponent(), generator).score(weights);
    own - other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::new();
        let gen = MoveGenerator::default();
        let weights = EvalWeights::default();
        assert_eq!(evaluate(&board, Player::Player1, &weights, &gen), 0);
        assert_eq!(evaluate(&board, Player::Player2, &weights, &gen), 0);
    }

    #[test]
    fn evaluation_is_antisymmetric() {
        let board = Board::from_layout(
            ".x.x.x.x/x.x.x.x./...x.x.x/..x...../......../o.o.o.o./.o.o.o.o/o.o.o.o.",
        )
        .unwrap();
        let gen = MoveGenerator::default();
        let w = EvalWeights::default();
        assert_eq!(
            evaluate(&board, Player::Player1, &w, &gen),
            -evaluate(&board, Player::Player2, &w, &gen)
        );
    }

    #[test]
    fn material_weights() {
        let mut board = Board::empty();
        board.place(sq(0, 1), Piece::king(Player::Player1)).unwrap();
        board.place(sq(7, 0), Piece::man(Player::Player2)).unwrap();
        let weights = EvalWeights { man: 3, king: 5, mobility: 0, center: 0, threat: 0 };
        let gen = MoveGenerator::default();
        assert_eq!(evaluate(&board, Player::Player1, &weights, &gen), 2);
    }

    #[test]
    fn centre_and_mobility_counts() {
        let mut board = Board::empty();
        board.place(sq(3, 4), Piece::man(Player::Player1)).unwrap();
        let f = side_features(&board, Player::Player1, &MoveGenerator::default());
        assert_eq!(f.center, 1);
        assert_eq!(f.mobility, 2);
        assert_eq!(f.men, 1);
    }

    #[test]
    fn threat_requires_attacker_direction_and_landing() {
        let mut board = Board::empty();
        board.place(sq(3, 2), Piece::man(Player::Player2)).unwrap();
        board.place(sq(2, 1), Piece::man(Player::Player1)).unwrap();
        // Each man faces the other with an empty cell behind
        assert!(is_threatened(&board, sq(3, 2)));
        assert!(is_threatened(&board, sq(2, 1)));

        board.place(sq(4, 3), Piece::man(Player::Player2)).unwrap();
        assert!(!is_threatened(&board, sq(3, 2)));

        // Men never capture backwards
        let mut board = Board::empty();
        board.place(sq(3, 2), Piece::man(Player::Player2)).unwrap();
        board.place(sq(4, 3), Piece::man(Player::Player1)).unwrap();
        assert!(!is_threatened(&board, sq(3, 2)));
        assert!(!is_threatened(&board, sq(4, 3)));
    }

    #[test]
    fn kings_threaten_in_every_direction() {
        let mut board = Board::empty();
        board.place(sq(3, 2), Piece::man(Player::Player1)).unwrap();
        board.place(sq(2, 1), Piece::man(Player::Player2)).unwrap();
        assert!(!is_threatened(&board, sq(3, 2)));

        board.place(sq(2, 1), Piece::king(Player::Player2)).unwrap();
        assert!(is_threatened(&board, sq(3, 2)));
    }
}
