//! The position capability every searchable game implements.

use std::fmt::Debug;

use crate::status::{Confidence, Status};

/// A move token that fits in 32 bits.
///
/// The search never looks inside a move; it only compares moves and stores
/// them in the transposition table, which needs a compact encoding.
pub trait CompactMove: Copy + Eq + Debug + Send + Sync + 'static {
    /// Pack the move into 32 bits.
    fn to_bits(self) -> u32;

    /// Rebuild a move from [`to_bits`](CompactMove::to_bits) output.
    ///
    /// Returns `None` when `bits` does not encode a move. Table entries can
    /// be stale or foreign, so a decoded move is only a hint and is played
    /// with [`Confidence::Unsafe`].
    fn from_bits(bits: u32) -> Option<Self>;
}

/// Mutable game state with make/unmake semantics.
///
/// `make_move(m, _)` followed by `unmake_move()` must restore the exact
/// previous state.
pub trait Position: Send + Sized {
    /// The move type of the game.
    type Move: CompactMove;

    /// Play `mv`. Returns `false`, leaving the position unchanged, when the
    /// move is illegal.
    ///
    /// Implementations may skip legality checks for [`Confidence::Legal`]
    /// moves but must validate the other kinds.
    fn make_move(&mut self, mv: Self::Move, confidence: Confidence) -> bool;

    /// Undo the last move played with [`make_move`](Position::make_move).
    fn unmake_move(&mut self);

    /// Moves to search, best candidates first. May contain illegal moves.
    fn moves(&self) -> Vec<Self::Move>;

    /// Legal moves only.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Status taking the game history into account (repetitions, move
    /// counters...). Checked before the moves of a node are searched.
    fn contextual_status(&self) -> Status;

    /// Status of a position in which no move could be played.
    ///
    /// Must not return [`Status::Playing`]: the search treats that as a bug in
    /// the game rules.
    fn end_game_status(&self) -> Status;

    /// Hash key of the position, if the game supports hashing.
    ///
    /// A transposition table is only used for games returning `Some`.
    fn hash_key(&self) -> Option<u64> {
        None
    }

    /// An independent copy of this position.
    ///
    /// The fork may drop the move history: it is then valid for forward
    /// exploration only and must never be asked to undo a move played
    /// before the fork. Moves played on the fork can be undone normally.
    fn fork(&self) -> Self;
}
