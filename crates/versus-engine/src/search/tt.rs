//! Lockless transposition table using XOR-based torn-write detection.
//!
//! Three `AtomicU64` words per entry (24 bytes).
//!
//! ## Bit layout
//!
//! ```text
//! data0:
//!   bits 63-32: move          (CompactMove bits)
//!   bits 31-0:  value         (i32 as u32, mate-distance encoded)
//!
//! data1:
//!   bits 31-24: generation    (8 bits, wraps at 256)
//!   bit  18:    has_move
//!   bits 17-16: bound         (2 bits)
//!   bits 15-0:  depth         (16 bits)
//!
//! check:        key XOR data0 XOR data1
//! ```
//!
//! ## Torn-write detection
//!
//! On probe the key is rebuilt as `check ^ data0 ^ data1`. If a concurrent
//! write interleaved with ours, or the slot holds another position, the
//! rebuilt key does not match and the probe misses. Any entry may therefore
//! be ignored safely: the table is a cache, never a source of truth.
//!
//! All atomic accesses use `Relaxed` ordering.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use versus_core::score::is_win_loss;
use versus_core::{CompactMove, Confidence, Position};

// ── Compile-time assertion: TT must be Send + Sync for root-parallel search ──
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<TranspositionTable<u32>>();
    }
    let _ = check;
};

/// Bound type stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// No bound information (empty entry).
    None = 0,
    /// The stored score is exact.
    Exact = 1,
    /// The stored score is a lower bound (failed high / beta cutoff).
    LowerBound = 2,
    /// The stored score is an upper bound (failed low).
    UpperBound = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Self {
        match bits & 0x03 {
            1 => Bound::Exact,
            2 => Bound::LowerBound,
            3 => Bound::UpperBound,
            _ => Bound::None,
        }
    }
}

/// Convert a search score to its stored form.
///
/// A win score counts plies from the search root, which depends on where
/// the node sits in the tree. Adding `max_depth - depth` (the plies from the
/// root to this node) makes it count from the node itself, so the entry
/// stays valid when the position is reached at another ply.
pub fn score_to_tt(value: i32, depth: u32, max_depth: u32) -> i32 {
    if is_win_loss(value) {
        value + value.signum() * (max_depth - depth) as i32
    } else {
        value
    }
}

/// Convert a stored score back to a search score.
///
/// Reverses the mate-distance adjustment applied by [`score_to_tt`].
pub fn tt_to_score(value: i32, depth: u32, max_depth: u32) -> i32 {
    if is_win_loss(value) {
        value - value.signum() * (max_depth - depth) as i32
    } else {
        value
    }
}

/// A decoded table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry<M> {
    /// Hash key of the position.
    pub key: u64,
    /// Bound type.
    pub bound: Bound,
    /// Remaining depth the value was computed with.
    pub depth: u32,
    /// Value in stored (node-relative) form, see [`tt_to_score`].
    pub value: i32,
    /// Best move found, if any.
    pub best_move: Option<M>,
    /// Generation the entry was written in.
    pub generation: u8,
}

impl<M> TtEntry<M> {
    /// Whether the entry carries any information.
    pub fn is_valid(&self) -> bool {
        self.bound != Bound::None
    }
}

// ── Internal entry type ──────────────────────────────────────────────────────

/// Three 64-bit atomic words — one logical TT slot.
struct AtomicEntry {
    check: AtomicU64,
    data0: AtomicU64,
    data1: AtomicU64,
}

impl AtomicEntry {
    const fn new() -> Self {
        Self {
            check: AtomicU64::new(0),
            data0: AtomicU64::new(0),
            data1: AtomicU64::new(0),
        }
    }

    fn pack_data0(value: i32, mv: Option<u32>) -> u64 {
        ((mv.unwrap_or(0) as u64) << 32) | (value as u32 as u64)
    }

    fn pack_data1(generation: u8, has_move: bool, bound: Bound, depth: u32) -> u64 {
        let depth = depth.min(u16::MAX as u32) as u64;
        ((generation as u64) << 24) | ((has_move as u64) << 18) | ((bound as u64) << 16) | depth
    }

    /// Load the slot, returning `(key, data0, data1)` as currently visible.
    fn load(&self) -> (u64, u64, u64) {
        let check = self.check.load(Ordering::Relaxed);
        let data0 = self.data0.load(Ordering::Relaxed);
        let data1 = self.data1.load(Ordering::Relaxed);
        (check ^ data0 ^ data1, data0, data1)
    }

    fn store(&self, key: u64, data0: u64, data1: u64) {
        self.data0.store(data0, Ordering::Relaxed);
        self.data1.store(data1, Ordering::Relaxed);
        self.check.store(key ^ data0 ^ data1, Ordering::Relaxed);
    }

    fn clear(&self) {
        self.check.store(0, Ordering::Relaxed);
        self.data0.store(0, Ordering::Relaxed);
        self.data1.store(0, Ordering::Relaxed);
    }

    fn decode<M: CompactMove>(key: u64, data0: u64, data1: u64) -> TtEntry<M> {
        let has_move = (data1 >> 18) & 1 != 0;
        TtEntry {
            key,
            bound: Bound::from_bits(data1 >> 16),
            depth: (data1 & 0xFFFF) as u32,
            value: data0 as u32 as i32,
            best_move: if has_move {
                M::from_bits((data0 >> 32) as u32)
            } else {
                None
            },
            generation: (data1 >> 24) as u8,
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Lockless, fixed-capacity transposition table.
///
/// All method receivers are `&self`: the table is shared by every worker of
/// a search and persists across searches until [`clear`](Self::clear).
pub struct TranspositionTable<M> {
    entries: Box<[AtomicEntry]>,
    /// Index mask — `num_entries - 1` (power-of-two allocation).
    mask: u64,
    /// Current generation, advanced by [`new_position`](Self::new_position).
    generation: AtomicU8,
    _move: PhantomData<fn() -> M>,
}

impl<M: CompactMove> TranspositionTable<M> {
    /// Create a table using at most `mb` megabytes (at least one entry).
    ///
    /// The number of entries is rounded down to a power of two.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.saturating_mul(1024 * 1024);
        Self::with_capacity(bytes / std::mem::size_of::<AtomicEntry>())
    }

    /// Create a table with `entries` slots, rounded down to a power of two.
    pub fn with_capacity(entries: usize) -> Self {
        let num_entries = match entries {
            0 => 1,
            n => 1 << (usize::BITS - 1 - n.leading_zeros()),
        };

        let entries: Box<[AtomicEntry]> = (0..num_entries).map(|_| AtomicEntry::new()).collect();

        Self {
            entries,
            mask: (num_entries - 1) as u64,
            generation: AtomicU8::new(0),
            _move: PhantomData,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Clear all entries and reset the generation counter.
    pub fn clear(&self) {
        for entry in self.entries.iter() {
            entry.clear();
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Signal that the analysed tree is no longer relevant (e.g. an
    /// unexpected move was played). Existing entries become replaceable.
    pub fn new_position(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Current generation.
    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Probe the table for a position.
    ///
    /// Returns `None` on a miss, key mismatch, or torn-write detection.
    pub fn probe(&self, key: u64) -> Option<TtEntry<M>> {
        let (stored_key, data0, data1) = self.slot(key).load();
        if stored_key != key {
            return None;
        }
        let entry = AtomicEntry::decode(stored_key, data0, data1);
        entry.is_valid().then_some(entry)
    }

    /// Store a position in the table.
    ///
    /// Empty slots are always written. When the slot holds a valid entry
    /// (for this or another key), `accept` decides whether to overwrite it.
    /// Returns whether the entry was written.
    pub fn store<F>(
        &self,
        key: u64,
        bound: Bound,
        depth: u32,
        value: i32,
        best_move: Option<M>,
        accept: F,
    ) -> bool
    where
        F: FnOnce(&TtEntry<M>) -> bool,
    {
        let entry = self.slot(key);

        let (existing_key, data0, data1) = entry.load();
        let existing = AtomicEntry::decode::<M>(existing_key, data0, data1);
        if existing.is_valid() && !accept(&existing) {
            return false;
        }

        let data0 = AtomicEntry::pack_data0(value, best_move.map(CompactMove::to_bits));
        let data1 = AtomicEntry::pack_data1(self.generation(), best_move.is_some(), bound, depth);
        entry.store(key, data0, data1);
        true
    }

    /// Per-mille of sampled slots holding an entry of the current generation.
    pub fn usage_permill(&self) -> usize {
        let generation = self.generation();
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample]
            .iter()
            .filter(|slot| {
                let (key, data0, data1) = slot.load();
                let entry = AtomicEntry::decode::<M>(key, data0, data1);
                entry.is_valid() && entry.generation == generation
            })
            .count();
        used * 1000 / sample
    }

    /// Follow the stored best moves from `position`.
    ///
    /// The line stops at the first miss, non-exact entry, rejected move,
    /// repeated position, or after `max_len` moves. `position` is restored
    /// before returning.
    pub fn principal_variation<P>(&self, position: &mut P, max_len: usize) -> Vec<M>
    where
        P: Position<Move = M>,
    {
        let mut line = Vec::new();
        let mut seen = Vec::new();

        while line.len() < max_len {
            let Some(key) = position.hash_key() else {
                break;
            };
            if seen.contains(&key) {
                break;
            }
            seen.push(key);

            let Some(mv) = self
                .probe(key)
                .filter(|entry| entry.bound == Bound::Exact)
                .and_then(|entry| entry.best_move)
            else {
                break;
            };
            if !position.make_move(mv, Confidence::Unsafe) {
                break;
            }
            line.push(mv);
        }

        for _ in 0..line.len() {
            position.unmake_move();
        }
        line
    }

    fn slot(&self, key: u64) -> &AtomicEntry {
        &self.entries[(key & self.mask) as usize]
    }
}

impl<M> std::fmt::Debug for TranspositionTable<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("entries", &self.entries.len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
