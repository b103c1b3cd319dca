//! Results of every completed depth of an iterative deepening search.

use versus_core::EvaluatedMove;

use crate::error::SearchError;
use crate::search::result::SearchParameters;

/// Ordered record of `(depth, moves)` pairs, each move list best first.
///
/// Depths strictly increase. The answer of the search is the cut of the
/// last recorded list.
#[derive(Debug, Clone)]
pub struct SearchHistory<M> {
    parameters: SearchParameters,
    entries: Vec<(u32, Vec<EvaluatedMove<M>>)>,
}

impl<M: Copy> SearchHistory<M> {
    /// An empty history.
    pub fn new(parameters: SearchParameters) -> Self {
        Self {
            parameters,
            entries: Vec::new(),
        }
    }

    /// The parameters deciding which moves the cut keeps.
    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// Record the moves evaluated at `depth`. The list is sorted best first.
    pub fn add(&mut self, mut moves: Vec<EvaluatedMove<M>>, depth: u32) -> Result<(), SearchError> {
        if let Some(last) = self.last_depth()
            && depth <= last
        {
            return Err(SearchError::DepthNotIncreasing { depth, last });
        }
        moves.sort();
        self.entries.push((depth, moves));
        Ok(())
    }

    /// Number of recorded depths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no depth was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The deepest recorded depth.
    pub fn last_depth(&self) -> Option<u32> {
        self.entries.last().map(|(depth, _)| *depth)
    }

    /// Depth of the `index`-th record.
    pub fn depth(&self, index: usize) -> Option<u32> {
        self.entries.get(index).map(|(depth, _)| *depth)
    }

    /// Moves of the `index`-th record, best first.
    pub fn moves(&self, index: usize) -> Option<&[EvaluatedMove<M>]> {
        self.entries.get(index).map(|(_, moves)| moves.as_slice())
    }

    /// Moves of the deepest record, best first. Empty when nothing was
    /// recorded.
    pub fn list(&self) -> &[EvaluatedMove<M>] {
        self.entries.last().map_or(&[], |(_, moves)| moves.as_slice())
    }

    /// The best moves of the deepest record.
    pub fn best_moves(&self) -> Vec<EvaluatedMove<M>> {
        self.parameters.cut(self.list())
    }

    /// The best move of the deepest record.
    pub fn best_move(&self) -> Option<&EvaluatedMove<M>> {
        self.list().first()
    }

    /// Every record, shallowest first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[EvaluatedMove<M>])> {
        self.entries.iter().map(|(depth, moves)| (*depth, moves.as_slice()))
    }

    pub(crate) fn list_mut(&mut self) -> Option<&mut [EvaluatedMove<M>]> {
        self.entries.last_mut().map(|(_, moves)| moves.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_core::Evaluation;

    fn moves(scores: &[(u32, i32)]) -> Vec<EvaluatedMove<u32>> {
        scores
            .iter()
            .map(|&(mv, score)| EvaluatedMove::new(mv, Evaluation::eval(score)))
            .collect()
    }

    #[test]
    fn empty_history() {
        let history = SearchHistory::<u32>::new(SearchParameters::default());
        assert!(history.is_empty());
        assert_eq!(history.last_depth(), None);
        assert!(history.list().is_empty());
        assert!(history.best_moves().is_empty());
        assert!(history.best_move().is_none());
    }

    #[test]
    fn records_are_sorted_and_cut() {
        let mut history = SearchHistory::new(SearchParameters::new(2, 0).unwrap());
        history.add(moves(&[(1, 3), (2, 8), (3, 5)]), 2).unwrap();
        let best: Vec<u32> = history.best_moves().iter().map(EvaluatedMove::mv).collect();
        assert_eq!(best, vec![2, 3]);
        assert_eq!(history.best_move().map(EvaluatedMove::mv), Some(2));
    }

    #[test]
    fn depth_must_increase() {
        let mut history = SearchHistory::new(SearchParameters::default());
        history.add(moves(&[(1, 3)]), 2).unwrap();
        assert_eq!(
            history.add(moves(&[(1, 4)]), 2),
            Err(SearchError::DepthNotIncreasing { depth: 2, last: 2 })
        );
        history.add(moves(&[(1, 4)]), 4).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.depth(0), Some(2));
        assert_eq!(history.last_depth(), Some(4));
        assert_eq!(history.moves(0).map(|m| m[0].score()), Some(3));
        assert_eq!(history.list()[0].score(), 4);
    }
}
