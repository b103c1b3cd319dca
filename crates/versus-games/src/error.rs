//! Errors for parsing game positions.

/// Errors that occur when parsing a position string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The board string does not describe exactly nine cells.
    #[error("expected 9 cells, found {found}")]
    WrongCellCount {
        /// Number of cells found.
        found: usize,
    },
    /// An unrecognized character appeared in the board string.
    #[error("invalid cell character: '{character}'")]
    InvalidCellChar {
        /// The invalid character.
        character: char,
    },
    /// The mark counts cannot arise from alternating play with X first.
    #[error("impossible mark counts: {x} X and {o} O")]
    ImpossibleCounts {
        /// Number of X marks.
        x: usize,
        /// Number of O marks.
        o: usize,
    },
    /// A stone count is not a valid number.
    #[error("invalid stone count: \"{found}\"")]
    InvalidStones {
        /// The invalid string.
        found: String,
    },
}
