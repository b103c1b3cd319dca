//! The static evaluation capability.

use crate::evaluation::Evaluation;
use crate::position::Position;
use crate::score;

/// Scores positions from the point of view of the side to move.
///
/// Incremental evaluators follow the move protocol of the search:
/// [`prepare_move`](Evaluator::prepare_move) is called on the position
/// before the move is played, [`commit_move`](Evaluator::commit_move) once
/// the position accepted it, and [`unmake_move`](Evaluator::unmake_move)
/// after the position undid it. A prepared move that the position rejects
/// is never committed; the next `prepare_move` replaces it.
pub trait Evaluator<P: Position>: Send + Sized {
    /// Static score of `position`, positive when the side to move is better.
    ///
    /// Must stay strictly between `-MATE_THRESHOLD` and `MATE_THRESHOLD`.
    fn evaluate(&mut self, position: &P) -> i32;

    /// Called before `mv` is played on `position`.
    fn prepare_move(&mut self, _position: &P, _mv: P::Move) {}

    /// Called once the prepared move has been played.
    fn commit_move(&mut self) {}

    /// Called after the last committed move has been undone.
    fn unmake_move(&mut self) {}

    /// Score of a win reached in `plies` half moves.
    fn win_score(&self, plies: u32) -> i32 {
        score::win_score(plies)
    }

    /// Number of plies to the win encoded by `score`, if it is a win score.
    fn plies_to_win(&self, score: i32) -> Option<u32> {
        score::plies_to_win(score)
    }

    /// Turn a raw search score into an [`Evaluation`].
    fn evaluation(&self, score: i32) -> Evaluation {
        if let Some(plies) = self.plies_to_win(score) {
            Evaluation::win(plies, score)
        } else if let Some(plies) = self.plies_to_win(-score) {
            Evaluation::loss(plies, score)
        } else {
            Evaluation::eval(score)
        }
    }

    /// An independent copy of this evaluator, including incremental state.
    fn fork(&self) -> Self;
}
