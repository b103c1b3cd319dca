//! The subtraction game: players alternately take 1 to `max_take` stones,
//! and whoever takes the last stone wins.
//!
//! The side to move wins exactly when `stones % (max_take + 1) != 0`, by
//! taking the remainder. Forced wins have a known length, which makes the
//! game handy for checking win distances.

use std::fmt;
use std::str::FromStr;

use versus_core::{CompactMove, Confidence, Evaluator, GameError, Position, Status};

use crate::error::ParseError;
use crate::zobrist;

/// Taking a number of stones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Take(pub u8);

impl CompactMove for Take {
    fn to_bits(self) -> u32 {
        self.0 as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u8::try_from(bits).ok().filter(|&n| n > 0).map(Take)
    }
}

impl fmt::Display for Take {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", self.0)
    }
}

/// A subtraction game position.
///
/// The value of a position only depends on the stone count, so the hash
/// ignores the side to move and positions transpose across plies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtraction {
    stones: u32,
    max_take: u8,
    history: Vec<Take>,
}

impl Subtraction {
    /// A pile of `stones`, taking up to 3 at a time.
    pub fn new(stones: u32) -> Self {
        Self::with_max_take(stones, 3)
    }

    /// A pile of `stones`, taking up to `max_take` (at least 1) at a time.
    pub fn with_max_take(stones: u32, max_take: u8) -> Self {
        Self {
            stones,
            max_take: max_take.max(1),
            history: Vec::new(),
        }
    }

    /// Stones left.
    pub fn stones(&self) -> u32 {
        self.stones
    }

    /// Take stones for the side to move, as a game would.
    pub fn play(&mut self, take: Take) -> Result<(), GameError> {
        if self.stones == 0 {
            return Err(GameError::GameOver);
        }
        if !self.make_move(take, Confidence::Unsafe) {
            return Err(GameError::IllegalMove {
                mv: take.to_string(),
            });
        }
        Ok(())
    }

    fn status(&self) -> Status {
        if self.stones == 0 {
            Status::Loss
        } else {
            Status::Playing
        }
    }
}

impl Position for Subtraction {
    type Move = Take;

    fn make_move(&mut self, mv: Take, _confidence: Confidence) -> bool {
        let n = mv.0 as u32;
        if n == 0 || mv.0 > self.max_take || n > self.stones {
            return false;
        }
        self.stones -= n;
        self.history.push(mv);
        true
    }

    /// # Panics
    ///
    /// Panics when there is no move to undo, including moves played before
    /// a fork.
    fn unmake_move(&mut self) {
        let Some(take) = self.history.pop() else {
            panic!("no move to undo");
        };
        self.stones += take.0 as u32;
    }

    /// Every take from 1 to `max_take`, even those exceeding the pile.
    fn moves(&self) -> Vec<Take> {
        (1..=self.max_take).map(Take).collect()
    }

    fn legal_moves(&self) -> Vec<Take> {
        self.moves()
            .into_iter()
            .filter(|take| take.0 as u32 <= self.stones)
            .collect()
    }

    fn contextual_status(&self) -> Status {
        self.status()
    }

    fn end_game_status(&self) -> Status {
        self.status()
    }

    fn hash_key(&self) -> Option<u64> {
        Some(zobrist::mix(self.stones as u64 | (self.max_take as u64) << 32))
    }

    fn fork(&self) -> Self {
        Self {
            stones: self.stones,
            max_take: self.max_take,
            history: Vec::new(),
        }
    }
}

impl FromStr for Subtraction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Subtraction::new)
            .map_err(|_| ParseError::InvalidStones {
                found: s.to_string(),
            })
    }
}

/// Knows nothing about the game: every position evaluates to 0.
///
/// Counts its calls so tests can observe how much the search evaluated.
#[derive(Debug, Clone, Default)]
pub struct SubtractionEvaluator {
    calls: u64,
}

impl SubtractionEvaluator {
    /// Number of static evaluations performed by this instance.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl Evaluator<Subtraction> for SubtractionEvaluator {
    fn evaluate(&mut self, _position: &Subtraction) -> i32 {
        self.calls += 1;
        0
    }

    fn fork(&self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_beyond_the_pile_are_rejected() {
        let mut game = Subtraction::new(2);
        assert_eq!(game.moves().len(), 3);
        assert_eq!(game.legal_moves(), vec![Take(1), Take(2)]);
        assert!(!game.make_move(Take(3), Confidence::PseudoLegal));
        assert_eq!(game.stones(), 2);
    }

    #[test]
    fn empty_pile_is_a_loss() {
        let mut game = Subtraction::new(3);
        game.play(Take(3)).unwrap();
        assert_eq!(game.contextual_status(), Status::Loss);
        assert_eq!(game.play(Take(1)), Err(GameError::GameOver));
    }

    #[test]
    fn hash_depends_on_stones_only() {
        let mut a = Subtraction::new(8);
        let mut b = Subtraction::new(8);
        a.play(Take(1)).unwrap();
        a.play(Take(2)).unwrap();
        b.play(Take(3)).unwrap();
        assert_eq!(a.hash_key(), b.hash_key());
        a.unmake_move();
        assert_ne!(a.hash_key(), b.hash_key());
    }

    #[test]
    #[should_panic(expected = "no move to undo")]
    fn fork_drops_history() {
        let mut game = Subtraction::new(8);
        game.play(Take(1)).unwrap();
        let mut fork = game.fork();
        assert_eq!(fork.stones(), 7);
        fork.unmake_move();
    }

    #[test]
    fn parse_stone_count() {
        let game: Subtraction = " 12 ".parse().unwrap();
        assert_eq!(game.stones(), 12);
        assert!("twelve".parse::<Subtraction>().is_err());
    }

    #[test]
    fn take_bits_roundtrip() {
        assert_eq!(Take::from_bits(Take(3).to_bits()), Some(Take(3)));
        assert_eq!(Take::from_bits(0), None);
    }
}
