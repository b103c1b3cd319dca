//! Alpha-beta in minimax form, without a transposition table.

use versus_core::score::INF;
use versus_core::{Confidence, Evaluator, Position};

use crate::search::context::SearchContext;
use crate::search::control::SearchControl;
use crate::search::root::{MoveSearch, end_score, no_move_score};

/// Fail-soft alpha-beta with explicit maximizing and minimizing players.
///
/// Scores are from the point of view of the player to move at the root.
#[derive(Debug, Clone, Copy)]
pub struct AlphaBeta<'a> {
    control: &'a SearchControl,
}

impl<'a> AlphaBeta<'a> {
    /// Alpha-beta polling `control`.
    pub fn new(control: &'a SearchControl) -> Self {
        Self { control }
    }

    /// Search the context's position within `(alpha, beta)`.
    pub fn search<P, E>(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        max_depth: u32,
        mut alpha: i32,
        mut beta: i32,
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
            let score = self.search(ctx, depth - 1, max_depth, alpha, beta, !maximizing);
            ctx.unmake_move();

            if maximizing {
                best = Some(best.map_or(score, |best| best.max(score)));
                alpha = alpha.max(score);
            } else {
                best = Some(best.map_or(score, |best| best.min(score)));
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }

        best.unwrap_or_else(|| sign * no_move_score(ctx, plies))
    }
}

impl<P: Position, E: Evaluator<P>> MoveSearch<P, E> for AlphaBeta<'_> {
    fn root_score(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        lower_bound: i32,
        mv: P::Move,
    ) -> Option<i32> {
        if !ctx.make_move(mv, Confidence::PseudoLegal) {
            return None;
        }
        let score = self.search(ctx, depth - 1, depth, lower_bound, INF, false);
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
    use crate::search::minimax::Minimax;
    use versus_games::{Cell, TicTacToe, TicTacToeEvaluator};

    #[test]
    fn agrees_with_minimax_and_prunes() {
        let control = SearchControl::default();
        let position: TicTacToe = "X../.O./...".parse().unwrap();

        let mut full = SearchContext::new(position.fork(), TicTacToeEvaluator);
        let mut pruned = SearchContext::new(position, TicTacToeEvaluator);
        for cell in [Cell::ALL[1], Cell::ALL[2], Cell::ALL[8]] {
            let expected = Minimax::new(&control).root_score(&mut full, 3, -INF, cell);
            let actual = AlphaBeta::new(&control).root_score(&mut pruned, 3, -INF, cell);
            assert_eq!(actual, expected, "{cell}");
        }
        assert!(pruned.statistics().moves_played() < full.statistics().moves_played());
    }
}
