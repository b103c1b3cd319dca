//! Iterative deepening over root moves, on one thread or a worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};
use versus_core::{CompactMove, Confidence, EvaluatedMove, Evaluator, Position};

use crate::error::SearchError;
use crate::search::context::SearchContext;
use crate::search::control::SearchControl;
use crate::search::deepening::{DeepeningPolicy, DefaultPolicy};
use crate::search::execution::{ExecutionContext, MultiThread, SingleThread};
use crate::search::history::SearchHistory;
use crate::search::negamax::Negamax;
use crate::search::policy::{BasicPolicy, TtPolicy};
use crate::search::result::SearchParameters;
use crate::search::root::best_moves;
use crate::search::statistics::SearchStatistics;
use crate::search::tt::TranspositionTable;

/// Searches the root moves of a position depth after depth with negamax,
/// keeping the best moves of the deepest completed depth.
///
/// The engine owns its stop signal: [`interrupt`](Self::interrupt) may be
/// called from any thread while [`search`](Self::search) runs, and the
/// search then returns what it established so far. One search runs at a
/// time per engine.
pub struct IterativeDeepeningEngine<M, D = DefaultPolicy, T = BasicPolicy> {
    deepening: D,
    tt_policy: T,
    table: Option<Arc<TranspositionTable<M>>>,
    parallelism: usize,
    control: SearchControl,
    running: AtomicBool,
}

impl<M: CompactMove> IterativeDeepeningEngine<M> {
    /// Single-threaded engine searching up to `max_depth`, without a
    /// transposition table.
    pub fn new(max_depth: u32) -> Self {
        Self::with_policies(DefaultPolicy::new(max_depth), BasicPolicy)
    }
}

impl<M, D, T> IterativeDeepeningEngine<M, D, T>
where
    M: CompactMove,
    D: DeepeningPolicy,
    T: TtPolicy,
{
    /// Single-threaded engine driven by the given policies.
    pub fn with_policies(deepening: D, tt_policy: T) -> Self {
        Self {
            deepening,
            tt_policy,
            table: None,
            parallelism: 1,
            control: SearchControl::default(),
            running: AtomicBool::new(false),
        }
    }

    /// The deepening policy.
    pub fn deepening(&self) -> &D {
        &self.deepening
    }

    /// The deepening policy, for reconfiguration between searches.
    pub fn deepening_mut(&mut self) -> &mut D {
        &mut self.deepening
    }

    /// Number of worker threads.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Search root moves on `workers` threads (at least one).
    pub fn set_parallelism(&mut self, workers: usize) {
        self.parallelism = workers.max(1);
    }

    /// Share `table` with this engine. Tables may be shared between engines
    /// searching the same game.
    pub fn set_transposition_table(&mut self, table: Arc<TranspositionTable<M>>) {
        self.table = Some(table);
    }

    /// Detach the transposition table.
    pub fn clear_transposition_table(&mut self) -> Option<Arc<TranspositionTable<M>>> {
        self.table.take()
    }

    /// The attached transposition table.
    pub fn transposition_table(&self) -> Option<&Arc<TranspositionTable<M>>> {
        self.table.as_ref()
    }

    /// Ask the running search to stop as soon as possible.
    pub fn interrupt(&self) {
        self.control.interrupt();
    }

    /// Whether the last search was interrupted, by a call to
    /// [`interrupt`](Self::interrupt) or by its time budget.
    pub fn is_interrupted(&self) -> bool {
        self.control.is_interrupted()
    }

    /// Whether a search is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Best moves of `position`, best first.
    ///
    /// Returns an empty list when the position has no legal move.
    pub fn search<P, E>(
        &self,
        position: &P,
        evaluator: &E,
        parameters: SearchParameters,
    ) -> Result<Vec<EvaluatedMove<M>>, SearchError>
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
    {
        self.search_with(position, evaluator, parameters, |_, _, _| {})
    }

    /// Like [`search`](Self::search), calling `on_depth(depth, best_moves,
    /// statistics)` after each completed depth.
    pub fn search_with<P, E, F>(
        &self,
        position: &P,
        evaluator: &E,
        parameters: SearchParameters,
        on_depth: F,
    ) -> Result<Vec<EvaluatedMove<M>>, SearchError>
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
        F: FnMut(u32, &[EvaluatedMove<M>], &SearchStatistics),
    {
        let history = self.deepen_with(position, evaluator, parameters, on_depth)?;
        Ok(history.best_moves())
    }

    /// Every completed depth of a search of `position`.
    pub fn deepen<P, E>(
        &self,
        position: &P,
        evaluator: &E,
        parameters: SearchParameters,
    ) -> Result<SearchHistory<M>, SearchError>
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
    {
        self.deepen_with(position, evaluator, parameters, |_, _, _| {})
    }

    /// Like [`deepen`](Self::deepen), with a per-depth callback.
    ///
    /// `position` and `evaluator` are forked: the caller's copies are never
    /// touched.
    pub fn deepen_with<P, E, F>(
        &self,
        position: &P,
        evaluator: &E,
        parameters: SearchParameters,
        on_depth: F,
    ) -> Result<SearchHistory<M>, SearchError>
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
        F: FnMut(u32, &[EvaluatedMove<M>], &SearchStatistics),
    {
        let max_depth = self.deepening.max_depth();
        let start_depth = self.deepening.start_depth();
        if max_depth == 0 || start_depth == 0 {
            return Err(SearchError::InvalidDepth {
                depth: i64::from(start_depth.min(max_depth)),
            });
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SearchError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        self.control.start(self.deepening.max_time());
        let context = SearchContext::new(position.fork(), evaluator.fork());
        let negamax = Negamax::with_policy(&self.control, self.table.as_deref(), &self.tt_policy);

        if self.parallelism > 1 {
            let mut executor = MultiThread::new(context, self.parallelism);
            self.run(&negamax, &mut executor, parameters, on_depth)
        } else {
            let mut executor = SingleThread::new(context);
            self.run(&negamax, &mut executor, parameters, on_depth)
        }
    }

    fn run<P, E, X, F>(
        &self,
        negamax: &Negamax<'_, M, T>,
        executor: &mut X,
        parameters: SearchParameters,
        mut on_depth: F,
    ) -> Result<SearchHistory<M>, SearchError>
    where
        P: Position<Move = M>,
        E: Evaluator<P>,
        X: ExecutionContext<P, E>,
        F: FnMut(u32, &[EvaluatedMove<M>], &SearchStatistics),
    {
        let max_depth = self.deepening.max_depth();
        let mut history = SearchHistory::new(parameters);
        let mut moves = executor.context().legal_moves();

        info!(
            moves = moves.len(),
            max_depth,
            workers = self.parallelism,
            "search started"
        );
        if moves.is_empty() {
            debug!("no legal move at the root");
            return Ok(history);
        }
        let forced = moves.len() == 1 && !self.deepening.deepen_on_forced();

        let mut proven: Vec<EvaluatedMove<M>> = Vec::new();
        let mut depth = self.deepening.start_depth();
        loop {
            let result = best_moves(negamax, executor, &moves, depth, parameters)?;

            if self.control.is_interrupted() {
                let partial = result.into_list();
                info!(depth, searched = partial.len(), "search interrupted");
                if let Some(merged) = self.deepening.merge_interrupted(&history, &partial, depth) {
                    history.add(merged, depth)?;
                }
                break;
            }

            let mut list = result.into_list();
            list.extend(proven.iter().cloned());
            history.add(list, depth)?;

            let best = history.best_moves();
            if let Some(top) = best.first() {
                debug!(depth, best = ?top.mv(), evaluation = %top.evaluation(), "depth completed");
            }
            on_depth(depth, &best, executor.context().statistics());

            if forced {
                debug!("single legal move, not deepening");
                break;
            }
            if depth >= max_depth {
                break;
            }
            let Some(next_moves) = self.deepening.moves_to_deepen(&history) else {
                debug!(depth, "deepening policy stopped the search");
                break;
            };
            let next_depth = self.deepening.next_depth(depth).min(max_depth);
            if !self
                .deepening
                .is_enough_time_to_deepen(next_depth, self.control.elapsed())
            {
                info!(depth, elapsed = ?self.control.elapsed(), "not enough time for another depth");
                break;
            }

            proven = history.list().iter().filter(|m| m.is_end()).cloned().collect();
            moves = next_moves;
            depth = next_depth;
        }

        if let Some(table) = self.table.as_deref() {
            attach_principal_variations(table, executor.context(), &mut history);
        }

        info!(
            depth = history.last_depth(),
            best = ?history.best_move().map(EvaluatedMove::mv),
            statistics = %executor.context().statistics(),
            "search finished"
        );
        Ok(history)
    }
}

impl<M, D, T> std::fmt::Debug for IterativeDeepeningEngine<M, D, T>
where
    M: CompactMove,
    D: DeepeningPolicy + std::fmt::Debug,
    T: TtPolicy,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterativeDeepeningEngine")
            .field("deepening", &self.deepening)
            .field("table", &self.table)
            .field("parallelism", &self.parallelism)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Lowers the running flag when the search ends, panics included.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Follow the table from each of the deepest record's best moves.
fn attach_principal_variations<P, E>(
    table: &TranspositionTable<P::Move>,
    ctx: &mut SearchContext<P, E>,
    history: &mut SearchHistory<P::Move>,
) where
    P: Position,
    E: Evaluator<P>,
{
    let Some(depth) = history.last_depth() else {
        return;
    };
    let best = history.best_moves().len();
    let Some(list) = history.list_mut() else {
        return;
    };
    for evaluated in list.iter_mut().take(best) {
        let mv = evaluated.mv();
        if !ctx.position_mut().make_move(mv, Confidence::Legal) {
            continue;
        }
        let mut line = vec![mv];
        let max_len = depth.saturating_sub(1) as usize;
        line.extend(table.principal_variation(ctx.position_mut(), max_len));
        ctx.position_mut().unmake_move();
        evaluated.set_principal_variation(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_core::score::win_score;
    use versus_core::{Evaluation, Status};
    use versus_games::{Cell, Subtraction, SubtractionEvaluator, Take, TicTacToe, TicTacToeEvaluator};

    #[test]
    fn zero_depth_is_rejected() {
        let engine = IterativeDeepeningEngine::new(0);
        let err = engine
            .search(&TicTacToe::new(), &TicTacToeEvaluator, SearchParameters::default())
            .unwrap_err();
        assert_eq!(err, SearchError::InvalidDepth { depth: 0 });
        assert!(!engine.is_running());
    }

    #[test]
    fn finished_game_has_no_best_move() {
        let position: TicTacToe = "XXX/OO./...".parse().unwrap();
        assert_eq!(position.contextual_status(), Status::Loss);
        let engine = IterativeDeepeningEngine::new(3);
        let best = engine
            .search(&position, &TicTacToeEvaluator, SearchParameters::default())
            .unwrap();
        assert!(best.is_empty());
    }

    #[test]
    fn callback_sees_every_depth() {
        let engine = IterativeDeepeningEngine::new(4);
        let mut depths = Vec::new();
        engine
            .search_with(
                &TicTacToe::new(),
                &TicTacToeEvaluator,
                SearchParameters::default(),
                |depth, best, _| {
                    assert!(!best.is_empty());
                    depths.push(depth);
                },
            )
            .unwrap();
        assert_eq!(depths, vec![2, 3, 4]);
    }

    #[test]
    fn proven_win_stops_deepening() {
        let engine = IterativeDeepeningEngine::new(10);
        let history = engine
            .deepen(
                &Subtraction::new(5),
                &SubtractionEvaluator::default(),
                SearchParameters::default(),
            )
            .unwrap();
        // Win in 3 plies is first seen at depth 4.
        assert_eq!(history.last_depth(), Some(4));
        let best = history.best_move().unwrap();
        assert_eq!(best.mv(), Take(1));
        assert_eq!(best.evaluation(), Evaluation::win(3, win_score(3)));
    }

    #[test]
    fn proven_moves_are_kept_in_later_depths() {
        let engine = IterativeDeepeningEngine::new(3);
        let history = engine
            .deepen(
                &Subtraction::new(3),
                &SubtractionEvaluator::default(),
                SearchParameters::new(3, 0).unwrap(),
            )
            .unwrap();
        // Taking all three stones wins at once and ends the search.
        assert_eq!(history.len(), 1);
        assert_eq!(history.best_move().unwrap().mv(), Take(3));
        assert_eq!(history.list().len(), 3);
    }

    #[test]
    fn single_legal_move_is_not_deepened() {
        let position: TicTacToe = "XOX/XOO/OX.".parse().unwrap();
        assert_eq!(position.legal_moves(), vec![Cell::ALL[8]]);

        let engine = IterativeDeepeningEngine::new(4);
        let history = engine
            .deepen(&position, &TicTacToeEvaluator, SearchParameters::default())
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.list()[0].score(), 0);

        let policy = DefaultPolicy::new(4).with_deepen_on_forced(true);
        let engine = IterativeDeepeningEngine::with_policies(policy, BasicPolicy);
        let history = engine
            .deepen(&position, &TicTacToeEvaluator, SearchParameters::default())
            .unwrap();
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn nested_search_is_rejected() {
        let engine = IterativeDeepeningEngine::new(3);
        let position = TicTacToe::new();
        let mut nested = None;
        engine
            .search_with(&position, &TicTacToeEvaluator, SearchParameters::default(), |_, _, _| {
                if nested.is_none() {
                    nested = Some(engine.search(&position, &TicTacToeEvaluator, SearchParameters::default()));
                }
            })
            .unwrap();
        assert_eq!(nested, Some(Err(SearchError::AlreadyRunning)));
        assert!(!engine.is_running());
    }

    #[test]
    fn interrupt_keeps_completed_depths() {
        let engine = IterativeDeepeningEngine::new(6);
        let history = engine
            .deepen_with(
                &TicTacToe::new(),
                &TicTacToeEvaluator,
                SearchParameters::default(),
                |depth, _, _| {
                    if depth == 3 {
                        engine.interrupt();
                    }
                },
            )
            .unwrap();
        assert!(engine.is_interrupted());
        assert_eq!(history.last_depth(), Some(3));
        assert_eq!(history.list().len(), 9);
    }

    #[test]
    fn interrupted_flag_is_reset_by_the_next_search() {
        let engine = IterativeDeepeningEngine::new(2);
        engine.interrupt();
        let best = engine
            .search(&TicTacToe::new(), &TicTacToeEvaluator, SearchParameters::default())
            .unwrap();
        assert!(!engine.is_interrupted());
        assert!(!best.is_empty());
    }

    #[test]
    fn principal_variation_starts_with_the_move() {
        let mut engine = IterativeDeepeningEngine::new(6);
        engine.set_transposition_table(Arc::new(TranspositionTable::new(1)));
        let best = engine
            .search(&Subtraction::new(5), &SubtractionEvaluator::default(), SearchParameters::default())
            .unwrap();
        let line = best[0].principal_variation();
        assert_eq!(line.first(), Some(&Take(1)));
        assert!(line.len() <= 4);
    }

    #[test]
    fn caller_position_is_untouched() {
        let position: TicTacToe = "X../.O./...".parse().unwrap();
        let before = position.to_string();
        let mut engine = IterativeDeepeningEngine::new(5);
        engine.set_parallelism(3);
        engine
            .search(&position, &TicTacToeEvaluator, SearchParameters::default())
            .unwrap();
        assert_eq!(position.to_string(), before);
    }
}
