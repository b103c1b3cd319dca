//! Errors raised by game implementations.

/// Errors from committing a move to a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A move was committed after the game ended.
    #[error("the game is over")]
    GameOver,
    /// The move is not legal in the current position.
    #[error("illegal move: {mv}")]
    IllegalMove {
        /// Display form of the rejected move.
        mv: String,
    },
}
