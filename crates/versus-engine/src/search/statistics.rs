//! Search counters shared by all forks of a search context.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by every thread of a search.
///
/// All updates are `Relaxed`: the counters are informational and only read
/// once the workers are done.
#[derive(Debug, Default)]
pub struct SearchStatistics {
    move_generations: AtomicU64,
    generated_moves: AtomicU64,
    moves_played: AtomicU64,
    evaluations: AtomicU64,
}

impl SearchStatistics {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every counter to zero.
    pub fn clear(&self) {
        self.move_generations.store(0, Ordering::Relaxed);
        self.generated_moves.store(0, Ordering::Relaxed);
        self.moves_played.store(0, Ordering::Relaxed);
        self.evaluations.store(0, Ordering::Relaxed);
    }

    /// Record a move generation that produced `count` moves.
    pub fn record_generation(&self, count: usize) {
        self.move_generations.fetch_add(1, Ordering::Relaxed);
        self.generated_moves.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a move accepted by the position.
    pub fn record_move(&self) {
        self.moves_played.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a static evaluation.
    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of move generations.
    pub fn move_generations(&self) -> u64 {
        self.move_generations.load(Ordering::Relaxed)
    }

    /// Total number of generated moves.
    pub fn generated_moves(&self) -> u64 {
        self.generated_moves.load(Ordering::Relaxed)
    }

    /// Number of moves played.
    pub fn moves_played(&self) -> u64 {
        self.moves_played.load(Ordering::Relaxed)
    }

    /// Number of static evaluations.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} move generations, {} generated moves, {} moves played, {} evaluations",
            self.move_generations(),
            self.generated_moves(),
            self.moves_played(),
            self.evaluations()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_clear() {
        let stats = SearchStatistics::new();
        stats.record_generation(9);
        stats.record_generation(8);
        stats.record_move();
        stats.record_evaluation();
        assert_eq!(stats.move_generations(), 2);
        assert_eq!(stats.generated_moves(), 17);
        assert_eq!(stats.moves_played(), 1);
        assert_eq!(stats.evaluations(), 1);

        stats.clear();
        assert_eq!(stats.generated_moves(), 0);
    }

    #[test]
    fn counters_are_shared_across_threads() {
        let stats = SearchStatistics::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        stats.record_move();
                    }
                });
            }
        });
        assert_eq!(stats.moves_played(), 4000);
    }
}
