//! Score scale shared by evaluators and the search.
//!
//! Scores are signed and always seen from the side to move. Plain
//! evaluations live strictly inside `(-MATE_THRESHOLD, MATE_THRESHOLD)`.
//! A forced win in `n` plies scores `WIN_SCORE - n`, a forced loss the
//! negation, so shorter wins and longer losses are preferred.

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 1_000_000;

/// Score of an immediate win (zero plies to the end).
pub const WIN_SCORE: i32 = 900_000;

/// Longest win distance the scale can express.
pub const MAX_PLIES: u32 = 10_000;

/// Scores strictly above this threshold (in absolute value) are wins or losses.
pub const MATE_THRESHOLD: i32 = WIN_SCORE - MAX_PLIES as i32;

/// Score of a win reached `plies` half moves from now.
pub const fn win_score(plies: u32) -> i32 {
    WIN_SCORE - plies as i32
}

/// Number of plies to the win encoded in `score`, if it is a win score.
pub const fn plies_to_win(score: i32) -> Option<u32> {
    if score > MATE_THRESHOLD && score <= WIN_SCORE {
        Some((WIN_SCORE - score) as u32)
    } else {
        None
    }
}

/// Whether `score` encodes a forced win or a forced loss.
pub const fn is_win_loss(score: i32) -> bool {
    score > MATE_THRESHOLD || score < -MATE_THRESHOLD
}
