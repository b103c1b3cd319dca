//! Search strategies, the transposition table, and iterative deepening.

pub mod alphabeta;
pub mod context;
pub mod control;
pub mod deepening;
pub mod execution;
pub mod history;
pub mod iterative;
pub mod minimax;
pub mod negamax;
pub mod policy;
pub mod result;
pub mod root;
pub mod statistics;
pub mod tt;
