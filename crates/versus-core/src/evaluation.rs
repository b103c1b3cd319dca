//! Search evaluations and ranked moves.

use std::cmp::Ordering;
use std::fmt;

/// What an [`Evaluation`] proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationKind {
    /// The side to move forces a win.
    Win,
    /// The side to move is forced to lose.
    Loss,
    /// A heuristic score.
    Eval,
}

/// The value of a move or position for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Evaluation {
    kind: EvaluationKind,
    score: i32,
    plies_to_end: Option<u32>,
}

impl Evaluation {
    /// A forced win in `plies` half moves, scored `score`.
    pub const fn win(plies: u32, score: i32) -> Self {
        Self {
            kind: EvaluationKind::Win,
            score,
            plies_to_end: Some(plies),
        }
    }

    /// A forced loss in `plies` half moves, scored `score`.
    pub const fn loss(plies: u32, score: i32) -> Self {
        Self {
            kind: EvaluationKind::Loss,
            score,
            plies_to_end: Some(plies),
        }
    }

    /// A heuristic score.
    pub const fn eval(score: i32) -> Self {
        Self {
            kind: EvaluationKind::Eval,
            score,
            plies_to_end: None,
        }
    }

    /// Kind of evaluation.
    pub const fn kind(&self) -> EvaluationKind {
        self.kind
    }

    /// Score, higher is better for the side to move.
    pub const fn score(&self) -> i32 {
        self.score
    }

    /// Distance to the end of the game, known for wins and losses only.
    pub const fn plies_to_end(&self) -> Option<u32> {
        self.plies_to_end
    }

    /// Whether the evaluation is a proven win or loss.
    pub const fn is_end(&self) -> bool {
        !matches!(self.kind, EvaluationKind::Eval)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.plies_to_end) {
            (EvaluationKind::Win, Some(plies)) => write!(f, "+M{plies}"),
            (EvaluationKind::Loss, Some(plies)) => write!(f, "-M{plies}"),
            _ => write!(f, "{}", self.score),
        }
    }
}

/// A move with its evaluation and, when known, the expected continuation.
///
/// Ranking compares scores only: two different moves with the same score are
/// equal, and sorting puts the best score first.
#[derive(Debug, Clone)]
pub struct EvaluatedMove<M> {
    mv: M,
    evaluation: Evaluation,
    principal_variation: Vec<M>,
}

impl<M: Copy> EvaluatedMove<M> {
    /// Pair a move with its evaluation.
    pub fn new(mv: M, evaluation: Evaluation) -> Self {
        Self {
            mv,
            evaluation,
            principal_variation: Vec::new(),
        }
    }

    /// The move.
    pub fn mv(&self) -> M {
        self.mv
    }

    /// The evaluation of the move.
    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    /// Shortcut for `self.evaluation().score()`.
    pub fn score(&self) -> i32 {
        self.evaluation.score
    }

    /// Whether the move leads to a proven win or loss.
    pub fn is_end(&self) -> bool {
        self.evaluation.is_end()
    }

    /// Expected line starting with this move, empty when unknown.
    pub fn principal_variation(&self) -> &[M] {
        &self.principal_variation
    }

    /// Attach the expected line starting with this move.
    pub fn set_principal_variation(&mut self, line: Vec<M>) {
        self.principal_variation = line;
    }
}

impl<M> PartialEq for EvaluatedMove<M> {
    fn eq(&self, other: &Self) -> bool {
        self.evaluation.score == other.evaluation.score
    }
}

impl<M> Eq for EvaluatedMove<M> {}

impl<M> PartialOrd for EvaluatedMove<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for EvaluatedMove<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.evaluation.score.cmp(&self.evaluation.score)
    }
}

impl<M: fmt::Debug> fmt::Display for EvaluatedMove<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}={}", self.mv, self.evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::win_score;

    #[test]
    fn sorting_puts_best_first() {
        let mut moves = vec![
            EvaluatedMove::new(1u8, Evaluation::eval(-5)),
            EvaluatedMove::new(2u8, Evaluation::win(3, win_score(3))),
            EvaluatedMove::new(3u8, Evaluation::eval(40)),
        ];
        moves.sort();
        let order: Vec<u8> = moves.iter().map(EvaluatedMove::mv).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn equality_ignores_the_move() {
        let a = EvaluatedMove::new(1u8, Evaluation::eval(10));
        let b = EvaluatedMove::new(2u8, Evaluation::eval(10));
        assert_eq!(a, b);
    }

    #[test]
    fn only_wins_and_losses_are_ends() {
        assert!(Evaluation::win(1, win_score(1)).is_end());
        assert!(Evaluation::loss(2, -win_score(2)).is_end());
        assert!(!Evaluation::eval(0).is_end());
        assert_eq!(Evaluation::eval(7).plies_to_end(), None);
    }

    #[test]
    fn display_uses_mate_notation() {
        assert_eq!(Evaluation::win(3, win_score(3)).to_string(), "+M3");
        assert_eq!(Evaluation::loss(2, -win_score(2)).to_string(), "-M2");
        assert_eq!(Evaluation::eval(-12).to_string(), "-12");
    }
}
