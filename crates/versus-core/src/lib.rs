//! Core game abstractions: positions, evaluators, and search scores.
//!
//! Nothing here knows the rules of a particular game. A game plugs into the
//! search engine by implementing [`Position`] and [`Evaluator`].

mod error;
mod evaluation;
mod evaluator;
mod position;
pub mod score;
mod status;

pub use error::GameError;
pub use evaluation::{EvaluatedMove, Evaluation, EvaluationKind};
pub use evaluator::Evaluator;
pub use position::{CompactMove, Position};
pub use status::{Confidence, Status};
