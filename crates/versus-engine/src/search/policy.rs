//! How the negamax engine reads from and writes to the transposition table.

use versus_core::CompactMove;

use crate::search::tt::{Bound, TranspositionTable, TtEntry};

/// Alpha-beta window of one node, as seen through the transposition table.
///
/// Built by [`TtPolicy::accept`] before the node's moves are searched,
/// completed by the engine with the node's value and best move, and handed
/// back to [`TtPolicy::store`]. Never stored itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaBetaState<M> {
    depth: u32,
    alpha: i32,
    beta: i32,
    updated_alpha: i32,
    updated_beta: i32,
    value: Option<i32>,
    best_move: Option<M>,
}

impl<M: CompactMove> AlphaBetaState<M> {
    /// A state for a node searched at `depth` with window `(alpha, beta)`.
    pub fn new(depth: u32, alpha: i32, beta: i32) -> Self {
        Self {
            depth,
            alpha,
            beta,
            updated_alpha: alpha,
            updated_beta: beta,
            value: None,
            best_move: None,
        }
    }

    /// Remaining depth of the node.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Alpha the node was called with.
    pub fn alpha(&self) -> i32 {
        self.alpha
    }

    /// Beta the node was called with.
    pub fn beta(&self) -> i32 {
        self.beta
    }

    /// Alpha after the table's lower bound was applied.
    pub fn updated_alpha(&self) -> i32 {
        self.updated_alpha
    }

    /// Beta after the table's upper bound was applied.
    pub fn updated_beta(&self) -> i32 {
        self.updated_beta
    }

    /// Value of the node, when known.
    pub fn value(&self) -> Option<i32> {
        self.value
    }

    /// Best move: an ordering hint after `accept`, the result after search.
    pub fn best_move(&self) -> Option<M> {
        self.best_move
    }

    /// Whether the node's value is resolved.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Raise alpha.
    pub fn set_updated_alpha(&mut self, alpha: i32) {
        self.updated_alpha = alpha;
    }

    /// Lower beta.
    pub fn set_updated_beta(&mut self, beta: i32) {
        self.updated_beta = beta;
    }

    /// Resolve the node's value.
    pub fn set_value(&mut self, value: i32) {
        self.value = Some(value);
    }

    /// Set the best move.
    pub fn set_best_move(&mut self, mv: Option<M>) {
        self.best_move = mv;
    }

    /// What the value tells about the node, relative to the searched window.
    pub fn bound(&self) -> Bound {
        match self.value {
            None => Bound::None,
            Some(value) if value <= self.updated_alpha => Bound::UpperBound,
            Some(value) if value >= self.updated_beta => Bound::LowerBound,
            Some(_) => Bound::Exact,
        }
    }
}

/// Acceptance and replacement rules for a transposition table.
pub trait TtPolicy: Send + Sync {
    /// Interpret `entry` for a node searched at `depth` with `(alpha, beta)`.
    ///
    /// `decode` turns the stored value back into a search score. The returned
    /// state is valid when the entry resolves the node, and otherwise carries
    /// a possibly narrower window and a best-move hint.
    fn accept<M, D>(
        &self,
        entry: Option<&TtEntry<M>>,
        depth: u32,
        alpha: i32,
        beta: i32,
        decode: D,
    ) -> AlphaBetaState<M>
    where
        M: CompactMove,
        D: Fn(i32) -> i32;

    /// Store the outcome of a searched node. `encode` turns the search score
    /// into its stored form. Returns whether the table was written.
    fn store<M, C>(
        &self,
        table: &TranspositionTable<M>,
        key: u64,
        state: &AlphaBetaState<M>,
        encode: C,
    ) -> bool
    where
        M: CompactMove,
        C: Fn(i32) -> i32;
}

/// The default policy.
///
/// Entries at least as deep as the node resolve it (exact values) or narrow
/// its window (bounds). Shallower entries only provide their best move.
/// Stores replace entries from older generations or not deeper than the new
/// one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPolicy;

impl TtPolicy for BasicPolicy {
    fn accept<M, D>(
        &self,
        entry: Option<&TtEntry<M>>,
        depth: u32,
        alpha: i32,
        beta: i32,
        decode: D,
    ) -> AlphaBetaState<M>
    where
        M: CompactMove,
        D: Fn(i32) -> i32,
    {
        let mut state = AlphaBetaState::new(depth, alpha, beta);
        let Some(entry) = entry else {
            return state;
        };
        state.set_best_move(entry.best_move);

        if entry.depth < depth {
            return state;
        }

        let value = decode(entry.value);
        match entry.bound {
            Bound::Exact => state.set_value(value),
            Bound::LowerBound if value > alpha => state.set_updated_alpha(value),
            Bound::UpperBound if value < beta => state.set_updated_beta(value),
            _ => {}
        }
        if !state.is_valid() && state.updated_alpha >= state.updated_beta {
            state.set_value(value);
        }
        state
    }

    fn store<M, C>(
        &self,
        table: &TranspositionTable<M>,
        key: u64,
        state: &AlphaBetaState<M>,
        encode: C,
    ) -> bool
    where
        M: CompactMove,
        C: Fn(i32) -> i32,
    {
        let Some(value) = state.value else {
            return false;
        };
        let depth = state.depth;
        let generation = table.generation();
        table.store(
            key,
            state.bound(),
            depth,
            encode(value),
            state.best_move,
            |old| old.generation != generation || old.depth <= depth,
        )
    }
}
