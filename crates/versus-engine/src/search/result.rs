//! Search parameters and the bounded, score-ordered result list.

use std::sync::{Mutex, MutexGuard, PoisonError};

use versus_core::score::INF;
use versus_core::{EvaluatedMove, Evaluation};

use crate::error::SearchError;

/// How many moves a search should return and how close to the best they
/// must be.
///
/// `size` is the number of best moves wanted. `accuracy` widens the cut:
/// every move scoring at least `kth_best - accuracy` is kept, so a result
/// can hold more than `size` moves when several score close to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    size: usize,
    accuracy: i32,
}

impl SearchParameters {
    /// Validated parameters: `size` must be positive, `accuracy` must not be
    /// negative.
    pub fn new(size: usize, accuracy: i32) -> Result<Self, SearchError> {
        if size == 0 {
            return Err(SearchError::InvalidSize { size: 0 });
        }
        if accuracy < 0 {
            return Err(SearchError::InvalidAccuracy {
                accuracy: i64::from(accuracy),
            });
        }
        Ok(Self { size, accuracy })
    }

    /// Number of best moves wanted.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Score tolerance below the `size`-th best move.
    pub fn accuracy(&self) -> i32 {
        self.accuracy
    }

    /// Score a move must beat to enter `sorted` (best first).
    ///
    /// `-INF` while the list holds fewer than `size` moves.
    pub fn low<M: Copy>(&self, sorted: &[EvaluatedMove<M>]) -> i32 {
        match sorted.get(self.size - 1) {
            Some(kth) => kth.score().saturating_sub(self.accuracy) - 1,
            None => -INF,
        }
    }

    /// The moves of `sorted` (best first) that are worth returning.
    pub fn cut<M: Copy>(&self, sorted: &[EvaluatedMove<M>]) -> Vec<EvaluatedMove<M>> {
        let Some(kth) = sorted.get(self.size - 1) else {
            return sorted.to_vec();
        };
        let threshold = kth.score().saturating_sub(self.accuracy);
        sorted
            .iter()
            .take_while(|m| m.score() >= threshold)
            .cloned()
            .collect()
    }
}

impl Default for SearchParameters {
    /// The single best move.
    fn default() -> Self {
        Self {
            size: 1,
            accuracy: 0,
        }
    }
}

/// Moves evaluated at one depth, best first, shared by every worker.
///
/// Equal scores keep their insertion order.
#[derive(Debug)]
pub struct SearchResult<M> {
    parameters: SearchParameters,
    list: Mutex<Vec<EvaluatedMove<M>>>,
}

impl<M: Copy + Eq> SearchResult<M> {
    /// An empty result.
    pub fn new(parameters: SearchParameters) -> Self {
        Self {
            parameters,
            list: Mutex::new(Vec::new()),
        }
    }

    /// The parameters the result was built with.
    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// Insert `mv` at its ranked position.
    pub fn add(&self, mv: M, evaluation: Evaluation) {
        insert(&mut self.lock(), EvaluatedMove::new(mv, evaluation));
    }

    /// Insert `mv`, replacing any previous evaluation of the same move.
    pub fn update(&self, mv: M, evaluation: Evaluation) {
        let mut list = self.lock();
        list.retain(|m| m.mv() != mv);
        insert(&mut list, EvaluatedMove::new(mv, evaluation));
    }

    /// Score a new move must beat to be worth an exact evaluation.
    pub fn low(&self) -> i32 {
        self.parameters.low(&self.lock())
    }

    /// The moves worth returning.
    pub fn cut(&self) -> Vec<EvaluatedMove<M>> {
        self.parameters.cut(&self.lock())
    }

    /// Every evaluated move, best first.
    pub fn list(&self) -> Vec<EvaluatedMove<M>> {
        self.lock().clone()
    }

    /// Number of evaluated moves.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no move has been evaluated.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every evaluated move, best first.
    pub fn into_list(self) -> Vec<EvaluatedMove<M>> {
        self.list.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EvaluatedMove<M>>> {
        // A worker panic never leaves the list half-updated.
        self.list.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert<M: Copy>(list: &mut Vec<EvaluatedMove<M>>, evaluated: EvaluatedMove<M>) {
    let index = list.partition_point(|m| m.score() >= evaluated.score());
    list.insert(index, evaluated);
}
