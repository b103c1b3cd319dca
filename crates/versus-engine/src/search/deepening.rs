//! When iterative deepening goes one ply further, and with which moves.

use std::time::Duration;

use versus_core::EvaluatedMove;

use crate::search::history::SearchHistory;

/// Decides the depths an iterative deepening search runs and the moves it
/// searches at each of them.
pub trait DeepeningPolicy: Send + Sync {
    /// Deepest depth to search.
    fn max_depth(&self) -> u32;

    /// Time budget of a search, `None` for no limit.
    fn max_time(&self) -> Option<Duration> {
        None
    }

    /// First depth searched.
    fn start_depth(&self) -> u32 {
        self.max_depth().min(2)
    }

    /// Depth searched after `depth`. Must exceed `depth`.
    fn next_depth(&self, depth: u32) -> u32 {
        depth + 1
    }

    /// Whether to keep deepening when the root has a single legal move.
    fn deepen_on_forced(&self) -> bool {
        false
    }

    /// Whether a search that already ran for `elapsed` should start
    /// `next_depth`.
    ///
    /// A new depth usually costs more than every previous one together, so
    /// by default none is started once half the budget is spent.
    fn is_enough_time_to_deepen(&self, _next_depth: u32, elapsed: Duration) -> bool {
        self.max_time().is_none_or(|budget| elapsed < budget / 2)
    }

    /// Moves to search at the next depth, best ranked first, or `None` to
    /// stop deepening.
    ///
    /// By default the search stops once the best move is proven a win or a
    /// loss; otherwise every move whose outcome is still open is searched.
    /// Proven moves stay in the history with their evaluation.
    fn moves_to_deepen<M: Copy>(&self, history: &SearchHistory<M>) -> Option<Vec<M>> {
        let moves = history.list();
        if moves.first().is_none_or(EvaluatedMove::is_end) {
            return None;
        }
        let open: Vec<M> = moves
            .iter()
            .filter(|m| !m.is_end())
            .map(EvaluatedMove::mv)
            .collect();
        (!open.is_empty()).then_some(open)
    }

    /// Combine the moves fully searched at an interrupted `depth` with the
    /// history. Returns the list to record at `depth`, or `None` when the
    /// partial results change nothing.
    ///
    /// By default only moves of the previous depth's cut can change: a move
    /// of the cut that was searched again takes its new evaluation, every
    /// other move keeps the one it had. Without a previous depth the
    /// partial list is kept as is.
    fn merge_interrupted<M: Copy + Eq>(
        &self,
        history: &SearchHistory<M>,
        partial: &[EvaluatedMove<M>],
        _depth: u32,
    ) -> Option<Vec<EvaluatedMove<M>>> {
        if history.is_empty() {
            return (!partial.is_empty()).then(|| partial.to_vec());
        }

        let cut = history.best_moves();
        let mut merged = history.list().to_vec();
        let mut changed = false;
        for evaluated in merged.iter_mut() {
            if !cut.iter().any(|m| m.mv() == evaluated.mv()) {
                continue;
            }
            if let Some(update) = partial.iter().find(|m| m.mv() == evaluated.mv())
                && update.evaluation() != evaluated.evaluation()
            {
                *evaluated = EvaluatedMove::new(update.mv(), update.evaluation());
                changed = true;
            }
        }
        if !changed {
            return None;
        }
        merged.sort();
        Some(merged)
    }
}

/// Deepens one ply at a time from depth 2 up to a maximum depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPolicy {
    max_depth: u32,
    max_time: Option<Duration>,
    start_depth: u32,
    deepen_on_forced: bool,
}

impl DefaultPolicy {
    /// Search up to `max_depth` with no time limit.
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            max_time: None,
            start_depth: 2,
            deepen_on_forced: false,
        }
    }

    /// Limit the search time.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Start at `depth` instead of 2.
    pub fn with_start_depth(mut self, depth: u32) -> Self {
        self.start_depth = depth;
        self
    }

    /// Keep deepening when the root has a single legal move.
    pub fn with_deepen_on_forced(mut self, deepen: bool) -> Self {
        self.deepen_on_forced = deepen;
        self
    }

    /// Change the maximum depth.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    /// Change or remove the time limit.
    pub fn set_max_time(&mut self, max_time: Option<Duration>) {
        self.max_time = max_time;
    }
}

impl DeepeningPolicy for DefaultPolicy {
    fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    fn start_depth(&self) -> u32 {
        self.start_depth.min(self.max_depth)
    }

    fn deepen_on_forced(&self) -> bool {
        self.deepen_on_forced
    }
}
