//! Zobrist hashing keys for tic-tac-toe positions.

/// Key for each (mark, cell) pair. Indexed by `[Mark::index()][Cell::index()]`.
pub(crate) static MARK_CELL: [[u64; 9]; 2] = {
    let mut table = [[0u64; 9]; 2];
    let mut state = SEED;
    let mut mark = 0;
    while mark < 2 {
        let mut cell = 0;
        while cell < 9 {
            let (val, next) = xorshift64(state);
            table[mark][cell] = val;
            state = next;
            cell += 1;
        }
        mark += 1;
    }
    table
};

/// Key XORed when O is the side to move.
pub(crate) static O_TO_MOVE: u64 = {
    let mut state = SEED;
    // Advance past the 18 mark-cell keys
    let mut i = 0;
    while i < 18 {
        let (_, next) = xorshift64(state);
        state = next;
        i += 1;
    }
    let (val, _) = xorshift64(state);
    val
};

const SEED: u64 = 0x5645_5253_5553_2121; // "VERSUS!!"

/// Xorshift64 PRNG. Returns (value, next_state).
const fn xorshift64(mut state: u64) -> (u64, u64) {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state, state)
}

/// SplitMix64 finalizer, used to hash small integer states.
pub(crate) const fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
