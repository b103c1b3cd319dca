//! The per-thread search state: position, evaluator, and counters.

use std::sync::Arc;

use versus_core::{Confidence, Evaluator, Position};

use crate::search::statistics::SearchStatistics;

/// Everything one thread needs to search: its own position and evaluator,
/// plus the statistics shared with every fork.
///
/// Moves must go through [`make_move`](SearchContext::make_move) and
/// [`unmake_move`](SearchContext::unmake_move) so the evaluator's
/// incremental hooks stay in step with the position.
#[derive(Debug)]
pub struct SearchContext<P, E> {
    position: P,
    evaluator: E,
    statistics: Arc<SearchStatistics>,
    nodes: u64,
}

impl<P: Position, E: Evaluator<P>> SearchContext<P, E> {
    /// Create a context with fresh statistics.
    pub fn new(position: P, evaluator: E) -> Self {
        Self::with_statistics(position, evaluator, Arc::new(SearchStatistics::new()))
    }

    /// Create a context reporting into existing statistics.
    pub fn with_statistics(position: P, evaluator: E, statistics: Arc<SearchStatistics>) -> Self {
        Self {
            position,
            evaluator,
            statistics,
            nodes: 0,
        }
    }

    /// The searched position.
    pub fn position(&self) -> &P {
        &self.position
    }

    /// The searched position, bypassing the evaluator hooks.
    ///
    /// Moves played here must be undone before the context is used again.
    pub fn position_mut(&mut self) -> &mut P {
        &mut self.position
    }

    /// The evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Statistics shared by this context and its forks.
    pub fn statistics(&self) -> &Arc<SearchStatistics> {
        &self.statistics
    }

    /// Nodes visited by this context (not its forks).
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Count a visited node and return the new total.
    pub(crate) fn visit(&mut self) -> u64 {
        self.nodes += 1;
        self.nodes
    }

    /// Play `mv`, keeping the evaluator in step. Returns `false` if the
    /// position rejected the move.
    pub fn make_move(&mut self, mv: P::Move, confidence: Confidence) -> bool {
        self.evaluator.prepare_move(&self.position, mv);
        if self.position.make_move(mv, confidence) {
            self.evaluator.commit_move();
            self.statistics.record_move();
            true
        } else {
            false
        }
    }

    /// Undo the last move played through this context.
    pub fn unmake_move(&mut self) {
        self.position.unmake_move();
        self.evaluator.unmake_move();
    }

    /// Moves to search from the current position, possibly pseudo-legal.
    pub fn moves(&mut self) -> Vec<P::Move> {
        let moves = self.position.moves();
        self.statistics.record_generation(moves.len());
        moves
    }

    /// Legal moves from the current position.
    pub fn legal_moves(&mut self) -> Vec<P::Move> {
        let moves = self.position.legal_moves();
        self.statistics.record_generation(moves.len());
        moves
    }

    /// Static evaluation of the current position.
    pub fn evaluate(&mut self) -> i32 {
        self.statistics.record_evaluation();
        self.evaluator.evaluate(&self.position)
    }

    /// An independent context for another thread.
    ///
    /// Position and evaluator are forked, statistics are shared, and the
    /// node counter starts at zero. The fork inherits the restrictions of
    /// [`Position::fork`]: it must not undo moves played before the fork.
    pub fn fork(&self) -> Self {
        Self {
            position: self.position.fork(),
            evaluator: self.evaluator.fork(),
            statistics: Arc::clone(&self.statistics),
            nodes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_games::{Cell, Subtraction, SubtractionEvaluator, Take, TicTacToe, TicTacToeEvaluator};

    #[test]
    fn fork_mutations_are_invisible_to_the_original() {
        let mut ctx = SearchContext::new(TicTacToe::new(), TicTacToeEvaluator);
        assert!(ctx.make_move(Cell::ALL[4], Confidence::Legal));

        let mut fork = ctx.fork();
        assert!(fork.make_move(Cell::ALL[0], Confidence::Legal));
        assert_eq!(ctx.position().mark(Cell::ALL[0]), None);

        assert!(ctx.make_move(Cell::ALL[8], Confidence::Legal));
        assert_eq!(fork.position().mark(Cell::ALL[8]), None);
    }

    #[test]
    fn fork_shares_statistics() {
        let mut ctx = SearchContext::new(Subtraction::new(10), SubtractionEvaluator::default());
        let mut fork = ctx.fork();
        assert!(fork.make_move(Take(1), Confidence::Legal));
        assert!(ctx.make_move(Take(2), Confidence::Legal));
        assert_eq!(ctx.statistics().moves_played(), 2);
        assert!(Arc::ptr_eq(ctx.statistics(), fork.statistics()));
    }

    #[test]
    fn rejected_move_is_not_counted() {
        let mut ctx = SearchContext::new(Subtraction::new(1), SubtractionEvaluator::default());
        assert!(!ctx.make_move(Take(3), Confidence::PseudoLegal));
        assert_eq!(ctx.statistics().moves_played(), 0);
        assert_eq!(ctx.position().stones(), 1);
    }

    #[test]
    fn generation_and_evaluation_are_counted() {
        let mut ctx = SearchContext::new(Subtraction::new(5), SubtractionEvaluator::default());
        assert_eq!(ctx.moves().len(), 3);
        assert_eq!(ctx.legal_moves().len(), 3);
        ctx.evaluate();
        assert_eq!(ctx.statistics().move_generations(), 2);
        assert_eq!(ctx.statistics().generated_moves(), 6);
        assert_eq!(ctx.statistics().evaluations(), 1);
        assert_eq!(ctx.evaluator().calls(), 1);
    }
}
