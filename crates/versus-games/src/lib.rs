//! Reference games implementing the versus capabilities.
//!
//! These are small enough to be solved exactly, which makes them good
//! fixtures for checking the search engine.

mod error;
pub mod subtraction;
pub mod tictactoe;
mod zobrist;

pub use error::ParseError;
pub use subtraction::{Subtraction, SubtractionEvaluator, Take};
pub use tictactoe::{Cell, Mark, TicTacToe, TicTacToeEvaluator};
