//! Search errors.

/// Errors reported by the search engine.
///
/// Interruption is not an error: an interrupted search returns the best
/// results it could establish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A search depth must be at least 1.
    #[error("invalid depth: {depth} (must be > 0)")]
    InvalidDepth {
        /// The rejected depth.
        depth: i64,
    },

    /// The number of best moves wanted must be at least 1.
    #[error("invalid result size: {size} (must be > 0)")]
    InvalidSize {
        /// The rejected size.
        size: i64,
    },

    /// The accuracy window cannot be negative.
    #[error("invalid accuracy: {accuracy} (must be >= 0)")]
    InvalidAccuracy {
        /// The rejected accuracy.
        accuracy: i64,
    },

    /// `search` was called on an engine that is already searching.
    #[error("a search is already running on this engine")]
    AlreadyRunning,

    /// A result was recorded in a search history at a depth that does not
    /// exceed the last recorded one.
    #[error("depth {depth} does not exceed last recorded depth {last}")]
    DepthNotIncreasing {
        /// The rejected depth.
        depth: u32,
        /// The last recorded depth.
        last: u32,
    },

    /// A worker thread panicked while searching a root move.
    #[error("search worker panicked: {message}")]
    WorkerPanicked {
        /// The panic message, when it was a string.
        message: String,
    },
}
