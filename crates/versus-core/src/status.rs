//! Game status and move-legality confidence.

/// Status of a position, seen from the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The game goes on.
    Playing,
    /// The game is drawn.
    Draw,
    /// The side to move has won.
    Win,
    /// The side to move has lost.
    Loss,
}

impl Status {
    /// Whether the game has ended.
    pub const fn is_over(self) -> bool {
        !matches!(self, Status::Playing)
    }
}

/// How much the caller trusts a move handed to
/// [`Position::make_move`](crate::Position::make_move).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// The move came from [`Position::legal_moves`](crate::Position::legal_moves).
    Legal,
    /// The move came from [`Position::moves`](crate::Position::moves) and may be illegal.
    PseudoLegal,
    /// The move has an unknown origin (e.g. a transposition table hint).
    Unsafe,
}
