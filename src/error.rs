//! OpusCheckers - Error types
//!
//! Invalid input is rejected at the API boundary with one of these errors;
//! it is never silently corrected.

use thiserror::Error;

use crate::types::Square;

/// Errors returned by rules and game operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Row or column outside `[0, 8)`
    #[error("invalid coordinates ({row}, {col})")]
    InvalidCoordinates { row: usize, col: usize },

    /// Origin cell holds no piece
    #[error("no piece at ({row}, {col})")]
    EmptySquare { row: usize, col: usize },

    /// Origin piece belongs to the side not on move
    #[error("piece at ({row}, {col}) does not belong to the side to move")]
    NotYourPiece { row: usize, col: usize },

    /// Target is not among the legal moves for the origin
    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    /// The game has already ended
    #[error("game is over")]
    GameOver,

    /// Malformed board layout string
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Malformed square or move notation
    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    /// Protocol command with a missing or malformed argument
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;
