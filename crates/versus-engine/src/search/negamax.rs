//! Negamax alpha-beta search backed by a transposition table.

use versus_core::score::INF;
use versus_core::{CompactMove, Confidence, Evaluator, Position};

use crate::search::context::SearchContext;
use crate::search::control::SearchControl;
use crate::search::policy::{AlphaBetaState, BasicPolicy, TtPolicy};
use crate::search::root::{MoveSearch, end_score, no_move_score};
use crate::search::tt::{TranspositionTable, score_to_tt, tt_to_score};

/// Fail-soft negamax with alpha-beta pruning.
///
/// Scores are from the side to move. When a transposition table is
/// attached, nodes with a hash key probe it through the [`TtPolicy`] and
/// store their outcome, unless the search was interrupted.
pub struct Negamax<'a, M, T = BasicPolicy> {
    control: &'a SearchControl,
    table: Option<&'a TranspositionTable<M>>,
    policy: &'a T,
}

impl<'a, M: CompactMove> Negamax<'a, M> {
    /// Plain negamax without a transposition table.
    pub fn new(control: &'a SearchControl) -> Self {
        Self {
            control,
            table: None,
            policy: &BasicPolicy,
        }
    }
}

impl<'a, M: CompactMove, T: TtPolicy> Negamax<'a, M, T> {
    /// Negamax reading and writing `table` (if any) through `policy`.
    pub fn with_policy(
        control: &'a SearchControl,
        table: Option<&'a TranspositionTable<M>>,
        policy: &'a T,
    ) -> Self {
        Self {
            control,
            table,
            policy,
        }
    }

    /// Attach a transposition table.
    pub fn with_table(self, table: &'a TranspositionTable<M>) -> Self {
        Self {
            table: Some(table),
            ..self
        }
    }

    /// Search the context's position.
    ///
    /// `depth` is the remaining depth and `max_depth` the depth of the root,
    /// so win scores count `max_depth - depth` plies from the root. At depth
    /// zero, or once stopped, the position is evaluated statically.
    ///
    /// # Panics
    ///
    /// Panics if no move can be played but the position reports the game
    /// as ongoing.
    pub fn search<P, E>(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        max_depth: u32,
        alpha: i32,
        beta: i32,
    ) -> i32
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
    {
        let nodes = ctx.visit();
        if depth == 0 || self.control.should_stop(nodes) {
            return ctx.evaluate();
        }

        let plies = max_depth - depth;
        let status = ctx.position().contextual_status();
        if let Some(score) = end_score::<P, E>(ctx.evaluator(), status, plies) {
            return score;
        }

        // Probe transposition table
        let key = self.table.and_then(|_| ctx.position().hash_key());
        let state = match (self.table, key) {
            (Some(table), Some(key)) => {
                let entry = table.probe(key);
                self.policy.accept(entry.as_ref(), depth, alpha, beta, |v| {
                    tt_to_score(v, depth, max_depth)
                })
            }
            _ => AlphaBetaState::new(depth, alpha, beta),
        };
        if let Some(value) = state.value() {
            return value;
        }

        let mut alpha = state.updated_alpha();
        let beta = state.updated_beta();

        // Hash move first, as long as the position offers it.
        let mut moves = ctx.moves();
        if let Some(hint) = state.best_move()
            && let Some(index) = moves.iter().position(|&mv| mv == hint)
        {
            moves[..=index].rotate_right(1);
        }

        let mut best: Option<(i32, M)> = None;
        for mv in moves {
            if !ctx.make_move(mv, Confidence::PseudoLegal) {
                continue;
            }
            let score = -self.search(ctx, depth - 1, max_depth, -beta, -alpha);
            ctx.unmake_move();

            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, mv));
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        let Some((value, best_move)) = best else {
            return no_move_score(ctx, plies);
        };

        if let (Some(table), Some(key)) = (self.table, key)
            && !self.control.is_interrupted()
        {
            let mut state = state;
            state.set_value(value);
            state.set_best_move(Some(best_move));
            self.policy
                .store(table, key, &state, |v| score_to_tt(v, depth, max_depth));
        }

        value
    }
}

impl<P, E, T> MoveSearch<P, E> for Negamax<'_, P::Move, T>
where
    P: Position,
    E: Evaluator<P>,
    T: TtPolicy,
{
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
        let score = -self.search(ctx, depth - 1, depth, -INF, -lower_bound);
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
    use versus_core::Status;
    use versus_core::score::win_score;
    use versus_games::{Cell, Subtraction, SubtractionEvaluator, Take, TicTacToe, TicTacToeEvaluator};

    fn subtraction(stones: u32) -> SearchContext<Subtraction, SubtractionEvaluator> {
        SearchContext::new(Subtraction::new(stones), SubtractionEvaluator::default())
    }

    #[test]
    fn depth_zero_evaluates_statically() {
        let control = SearchControl::default();
        let mut ctx = subtraction(0);
        let score = Negamax::new(&control).search(&mut ctx, 0, 0, -INF, INF);
        assert_eq!(score, 0);
        assert_eq!(ctx.evaluator().calls(), 1);
    }

    #[test]
    fn finished_game_scores_by_distance() {
        let control = SearchControl::default();
        let mut ctx = subtraction(0);
        let score = Negamax::new(&control).search(&mut ctx, 2, 5, -INF, INF);
        assert_eq!(score, -win_score(3));
    }

    #[test]
    fn finds_forced_win() {
        // Taking one leaves a multiple of four.
        let control = SearchControl::default();
        let mut ctx = subtraction(5);
        let score = Negamax::new(&control).search(&mut ctx, 4, 4, -INF, INF);
        assert_eq!(score, win_score(3));
    }

    #[test]
    fn lost_position_is_lost_whatever_the_move() {
        let control = SearchControl::default();
        let mut ctx = subtraction(4);
        let score = Negamax::new(&control).search(&mut ctx, 3, 3, -INF, INF);
        assert_eq!(score, -win_score(2));
    }

    #[test]
    fn table_does_not_change_the_value() {
        let control = SearchControl::default();
        let table = TranspositionTable::new(1);
        for stones in 1..9 {
            let plain = Negamax::new(&control).search(&mut subtraction(stones), 9, 9, -INF, INF);
            let cached = Negamax::new(&control).with_table(&table).search(
                &mut subtraction(stones),
                9,
                9,
                -INF,
                INF,
            );
            assert_eq!(plain, cached, "{stones} stones");
        }
    }

    #[test]
    fn table_saves_work_on_transpositions() {
        let control = SearchControl::default();
        let table = TranspositionTable::new(1);
        let mut plain = subtraction(12);
        Negamax::new(&control).search(&mut plain, 8, 8, -INF, INF);
        let mut cached = subtraction(12);
        Negamax::new(&control).with_table(&table).search(&mut cached, 8, 8, -INF, INF);
        assert!(cached.statistics().moves_played() < plain.statistics().moves_played());
        assert!(table.probe(Subtraction::new(12).hash_key().unwrap()).is_some());
    }

    #[test]
    fn interrupted_search_stores_nothing() {
        let control = SearchControl::default();
        control.interrupt();
        let table = TranspositionTable::new(1);
        Negamax::new(&control).with_table(&table).search(&mut subtraction(9), 6, 6, -INF, INF);
        assert_eq!(table.usage_permill(), 0);
    }

    #[test]
    fn root_score_rejects_illegal_move() {
        let control = SearchControl::default();
        let mut ctx = subtraction(2);
        assert_eq!(Negamax::new(&control).root_score(&mut ctx, 3, -INF, Take(3)), None);
        assert_eq!(ctx.position().stones(), 2);
    }

    #[test]
    fn root_score_sees_win_in_one() {
        let control = SearchControl::default();
        let position: TicTacToe = "XX./OO./...".parse().unwrap();
        let mut ctx = SearchContext::new(position, TicTacToeEvaluator);
        let score = Negamax::new(&control).root_score(&mut ctx, 2, -INF, Cell::ALL[2]);
        assert_eq!(score, Some(win_score(1)));
    }

    #[test]
    #[should_panic(expected = "no playable move")]
    fn missing_end_status_is_fatal() {
        #[derive(Debug)]
        struct Stuck;

        impl Position for Stuck {
            type Move = Take;

            fn make_move(&mut self, _: Take, _: Confidence) -> bool {
                false
            }
            fn unmake_move(&mut self) {}
            fn moves(&self) -> Vec<Take> {
                vec![Take(1)]
            }
            fn legal_moves(&self) -> Vec<Take> {
                Vec::new()
            }
            fn contextual_status(&self) -> Status {
                Status::Playing
            }
            fn end_game_status(&self) -> Status {
                Status::Playing
            }
            fn fork(&self) -> Self {
                Stuck
            }
        }

        struct Zero;

        impl Evaluator<Stuck> for Zero {
            fn evaluate(&mut self, _: &Stuck) -> i32 {
                0
            }
            fn fork(&self) -> Self {
                Zero
            }
        }

        let control = SearchControl::default();
        let mut ctx = SearchContext::new(Stuck, Zero);
        Negamax::new(&control).search(&mut ctx, 2, 2, -INF, INF);
    }
}
