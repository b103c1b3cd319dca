//! Game-agnostic adversarial search.
//!
//! The engine searches any game implementing [`versus_core::Position`]
//! scored by a [`versus_core::Evaluator`]. [`IterativeDeepeningEngine`] is
//! the entry point: it ranks the root moves depth after depth with
//! [`Negamax`], optionally backed by a shared [`TranspositionTable`] and
//! spread over worker threads.

pub mod error;
pub mod search;

pub use error::SearchError;
pub use search::alphabeta::AlphaBeta;
pub use search::context::SearchContext;
pub use search::control::SearchControl;
pub use search::deepening::{DeepeningPolicy, DefaultPolicy};
pub use search::execution::{ExecutionContext, MultiThread, SingleThread};
pub use search::history::SearchHistory;
pub use search::iterative::IterativeDeepeningEngine;
pub use search::minimax::Minimax;
pub use search::negamax::Negamax;
pub use search::policy::{AlphaBetaState, BasicPolicy, TtPolicy};
pub use search::result::{SearchParameters, SearchResult};
pub use search::root::{MoveSearch, best_moves};
pub use search::statistics::SearchStatistics;
pub use search::tt::{Bound, TranspositionTable, TtEntry};
