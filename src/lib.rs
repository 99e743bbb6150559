//! OpusCheckers - Checkers Engine
//!
//! An 8x8 checkers engine written in Rust with support for:
//! - Men moving diagonally forward, kings in all four directions
//! - Single jumps with an optional force-jump rule
//! - Crowning on the far row and end-of-game detection
//! - Minimax search with alpha-beta pruning and optional tree capture
//! - Multi-threaded root-split search
//! - A line-based text protocol for front ends

pub mod types;
pub mod error;
pub mod board;
pub mod move_generator;
pub mod evaluation;
pub mod game;
pub mod search;
pub mod parallel_search;
pub mod protocol;

pub use board::{Board, Move, MoveKind};
pub use error::{EngineError, EngineResult};
pub use game::{GameState, MoveReport, Outcome};
pub use search::{Algorithm, Level, SearchConfig, SearchEngine, SearchResult};
pub use types::{Cell, Piece, Player, Square};
