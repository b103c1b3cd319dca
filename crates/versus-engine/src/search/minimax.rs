//! Exhaustive minimax, the reference the pruning searches are checked against.

use versus_core::{Confidence, Evaluator, Position};

use crate::search::context::SearchContext;
use crate::search::control::SearchControl;
use crate::search::root::{MoveSearch, end_score, no_move_score};

/// Plain minimax: every move of every node is searched.
///
/// Scores are from the point of view of the player to move at the root.
#[derive(Debug, Clone, Copy)]
pub struct Minimax<'a> {
    control: &'a SearchControl,
}

impl<'a> Minimax<'a> {
    /// Minimax polling `control`.
    pub fn new(control: &'a SearchControl) -> Self {
        Self { control }
    }

    /// Search the context's position, `maximizing` when the root player is
    /// to move.
    pub fn search<P, E>(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        max_depth: u32,
        maximizing: bool,
    ) -> i32
    where
        P: Position,
        E: Evaluator<P>,
    {
        let sign = if maximizing { 1 } else { -1 };

        let nodes = ctx.visit();
        if depth == 0 || self.control.should_stop(nodes) {
            return sign * ctx.evaluate();
        }

        let plies = max_depth - depth;
        let status = ctx.position().contextual_status();
        if let Some(score) = end_score::<P, E>(ctx.evaluator(), status, plies) {
            return sign * score;
        }

        let mut best: Option<i32> = None;
        for mv in ctx.moves() {
            if !ctx.make_move(mv, Confidence::PseudoLegal) {
                continue;
            }
            let score = self.search(ctx, depth - 1, max_depth, !maximizing);
            ctx.unmake_move();

            best = Some(match best {
                None => score,
                Some(best) if maximizing => best.max(score),
                Some(best) => best.min(score),
            });
        }

        best.unwrap_or_else(|| sign * no_move_score(ctx, plies))
    }
}

impl<P: Position, E: Evaluator<P>> MoveSearch<P, E> for Minimax<'_> {
    fn root_score(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        _lower_bound: i32,
        mv: P::Move,
    ) -> Option<i32> {
        if !ctx.make_move(mv, Confidence::PseudoLegal) {
            return None;
        }
        let score = self.search(ctx, depth - 1, depth, false);
        ctx.unmake_move();
        Some(score)
    }

    fn control(&self) -> &SearchControl {
        self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_core::score::{INF, win_score};
    use versus_games::{Subtraction, SubtractionEvaluator, Take};

    #[test]
    fn scores_are_from_the_root_player() {
        let control = SearchControl::default();
        let mut ctx = SearchContext::new(Subtraction::new(5), SubtractionEvaluator::default());
        let minimax = Minimax::new(&control);
        assert_eq!(minimax.root_score(&mut ctx, 4, -INF, Take(1)), Some(win_score(3)));
        assert_eq!(minimax.root_score(&mut ctx, 4, -INF, Take(3)), Some(-win_score(2)));
    }

    #[test]
    fn searches_every_node() {
        let control = SearchControl::default();
        let mut ctx = SearchContext::new(Subtraction::new(20), SubtractionEvaluator::default());
        Minimax::new(&control).search(&mut ctx, 3, 3, true);
        // 3 + 9 + 27 moves, 27 leaves.
        assert_eq!(ctx.statistics().moves_played(), 39);
        assert_eq!(ctx.evaluator().calls(), 27);
    }
}
