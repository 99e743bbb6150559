use opus_checkers::board::STARTING_LAYOUT;
use opus_checkers::move_generator::{move_directions, MoveGenerator};
use opus_checkers::*;

fn sq(row: usize, col: usize) -> Square {
    Square::new(row, col).unwrap()
}

#[test]
fn opening_step_moves_piece_and_passes_turn() {
    let mut game = GameState::new_game(Player::Player1, true);
    game.apply_move(sq(2, 1), sq(3, 0)).unwrap();

    assert!(game.board().cell(sq(2, 1)).is_empty());
    assert_eq!(game.board().cell(sq(3, 0)), Cell::Occupied(Piece::man(Player::Player1)));
    assert_eq!(game.turn(), Player::Player2);
    assert_eq!(game.history(), &[Move::step(sq(2, 1), sq(3, 0))]);
}

#[test]
fn jump_removes_the_captured_piece() {
    let board = Board::from_layout(
        "......../......../.x....../..o...../......../......../......../o.......",
    )
    .unwrap();
    let mut game = GameState::from_board(board, Player::Player1, true);
    let before = game.captured().len();

    let report = game.apply_move(sq(2, 1), sq(4, 3)).unwrap();

    assert!(game.board().cell(sq(3, 2)).is_empty());
    assert_eq!(game.captured().len(), before + 1);
    assert_eq!(report.captured.map(|c| c.square), Some(sq(3, 2)));
    assert!(!game.is_end());
}

#[test]
fn blocked_opponent_loses() {
    // Player2's man on (1,0) can only step to (0,1); the king takes that cell
    let board = Board::from_layout(
        "......../o.X...../......../......../......../......../......../........",
    )
    .unwrap();
    let mut game = GameState::from_board(board, Player::Player1, true);
    assert!(!game.is_end());

    let report = game.apply_move(sq(1, 2), sq(0, 1)).unwrap();

    assert_eq!(report.outcome, Some(Outcome::Win(Player::Player1)));
    assert!(game.is_end());
    assert_eq!(game.winner(), Some(Outcome::Win(Player::Player1)));
    assert!(game.movable_pieces().is_empty());
}

#[test]
fn opening_mobility_is_four_pieces_for_either_side() {
    for player in [Player::Player1, Player::Player2] {
        let game = GameState::new_game(player, true);
        let pieces = game.movable_pieces();
        assert_eq!(pieces.len(), 4, "{}", player);

        let inner_row = match player {
            Player::Player1 => 2,
            Player::Player2 => 5,
        };
        assert!(pieces.iter().all(|pm| pm.square.row() == inner_row));
    }
}

#[test]
fn man_reaching_far_row_is_crowned() {
    let board = Board::from_layout(
        "......../......../......../......../.o....../......../.x....../........",
    )
    .unwrap();
    let mut game = GameState::from_board(board, Player::Player1, true);

    let report = game.apply_move(sq(6, 1), sq(7, 2)).unwrap();

    assert!(report.promoted);
    assert_eq!(game.board().cell(sq(7, 2)), Cell::Occupied(Piece::king(Player::Player1)));
}

#[test]
fn player2_is_crowned_on_row_zero() {
    let board = Board::from_layout(
        "......../o......./......../......../......../......../.x....../........",
    )
    .unwrap();
    let mut game = GameState::from_board(board, Player::Player2, true);

    game.apply_move(sq(1, 0), sq(0, 1)).unwrap();

    assert_eq!(game.board().cell(sq(0, 1)), Cell::Occupied(Piece::king(Player::Player2)));
}

#[test]
fn possible_moves_land_on_reachable_empty_cells() {
    for seed in 0..8 {
        let game = GameState::random_playout(seed, 20, seed % 2 == 0);
        let board = game.board();

        for row in 0..8 {
            for col in 0..8 {
                let piece = match board.get(row, col).unwrap().piece() {
                    Some(p) => p,
                    None => continue,
                };
                let moves = game.possible_moves(row, col);

                for mv in &moves {
                    assert!(board.cell(mv.to).is_empty(), "seed {} {}", seed, mv);
                    let dr = mv.to.row() as i32 - row as i32;
                    let dc = mv.to.col() as i32 - col as i32;
                    let steps = if mv.is_jump() { 2 } else { 1 };
                    assert_eq!(dr.abs(), steps);
                    assert_eq!(dc.abs(), steps);
                    assert!(move_directions(piece.owner, piece.king).contains(&(dr / steps, dc / steps)));

                    if let Some(captured) = mv.captured_square() {
                        assert!(board.cell(captured).is_owned_by(piece.owner.opponent()));
                    }
                }

                if game.force_jump() && moves.iter().any(Move::is_jump) {
                    assert!(moves.iter().all(Move::is_jump), "seed {}", seed);
                }
            }
        }
    }
}

#[test]
fn reversing_king_steps_restores_the_board() {
    let board = Board::from_layout(
        "......../......../......../..X...../......../......../.....O../........",
    )
    .unwrap();
    let mut game = GameState::from_board(board, Player::Player1, true);

    game.apply_move(sq(3, 2), sq(4, 3)).unwrap();
    game.apply_move(sq(6, 5), sq(7, 6)).unwrap();
    game.apply_move(sq(4, 3), sq(3, 2)).unwrap();
    game.apply_move(sq(7, 6), sq(6, 5)).unwrap();

    assert_eq!(*game.board(), board);
    assert_eq!(game.turn(), Player::Player1);
    assert!(game.captured().is_empty());
}

#[test]
fn out_of_range_coordinates() {
    let board = Board::new();
    let generator = MoveGenerator::default();

    assert!(generator.possible_moves(&board, 8, 1).is_empty());
    assert_eq!(
        generator.checked_possible_moves(&board, 8, 1),
        Err(EngineError::InvalidCoordinates { row: 8, col: 1 })
    );
    assert_eq!(
        generator.checked_possible_moves(&board, 3, 0),
        Err(EngineError::EmptySquare { row: 3, col: 0 })
    );
    assert!(board.get(0, 9).is_err());
}

#[test]
fn squares_never_leave_the_board() {
    for (row, col) in [(8, 1), (9, 0), (0, 8), (usize::MAX, 0)] {
        assert_eq!(Square::new(row, col), Err(EngineError::InvalidCoordinates { row, col }));
    }
    assert!(Square::parse("i3").is_err());
    assert!(Square::parse("a9").is_err());

    // Every square reachable by offsetting stays inside the grid
    for row in 0..8 {
        for col in 0..8 {
            let origin = sq(row, col);
            for (dr, dc) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
                for steps in 1..=2 {
                    if let Some(target) = origin.offset(dr, dc, steps) {
                        assert!(target.row() < 8 && target.col() < 8);
                        assert!(Board::empty().get(target.row(), target.col()).is_ok());
                    }
                }
            }
        }
    }

    let mut game = GameState::new_game(Player::Player1, true);
    let before = game.clone();
    assert!(Square::new(8, 1).and_then(|from| game.apply_move(from, sq(3, 0))).is_err());
    assert_eq!(game, before);
}

#[test]
fn layout_round_trip() {
    assert_eq!(Board::new().to_layout(), STARTING_LAYOUT);

    let game = GameState::random_playout(13, 25, true);
    let layout = game.board().to_layout();
    assert_eq!(Board::from_layout(&layout).unwrap(), *game.board());

    assert!(matches!(Board::from_layout("x"), Err(EngineError::InvalidLayout(_))));
}

#[test]
fn perft_counts_opening_tree() {
    let mut board = Board::new();
    let generator = MoveGenerator::default();
    assert_eq!(generator.perft(&mut board, Player::Player1, 1), 7);
    assert_eq!(generator.perft(&mut board, Player::Player1, 2), 49);
    assert_eq!(board, Board::new());
}
