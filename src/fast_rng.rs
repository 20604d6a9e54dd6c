// PCG-LCG random number generator with O(log n) skip-ahead.
//
// Every generator owns its 8 bytes of state; there is no process-wide
// generator. Independent workers take disjoint streams of one master seed via
// `FastRng::with_stream`, so a run is reproducible for a given seed and
// worker count.

use rand::{RngCore, SeedableRng};

/// LCG multiplier
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant
const PRN_ADD: u64 = 1442695040888963407;
/// Number of LCG steps separating consecutive streams. The 2^64 period holds
/// 65 536 streams of this length, far more draws per worker than any run uses.
pub const STREAM_STRIDE: u64 = 1 << 48;

/// Fast RNG using a PCG output permutation over a 64-bit LCG.
///
/// Reference: Melissa E. O'Neill, "PCG: A Family of Simple Fast Space-Efficient
/// Statistically Good Algorithms for Random Number Generation"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastRng {
    seed: u64,
}

impl FastRng {
    /// Create a new FastRng with the given seed
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generator for stream `stream` of `master_seed`: the master state jumped
    /// ahead by `stream * STREAM_STRIDE` steps. Streams 65 536 apart coincide.
    pub fn with_stream(master_seed: u64, stream: u64) -> Self {
        Self {
            seed: future_seed(stream.wrapping_mul(STREAM_STRIDE), master_seed),
        }
    }

    /// Skip the next `n` outputs without generating them.
    pub fn advance(&mut self, n: u64) {
        self.seed = future_seed(n, self.seed);
    }

    /// Current raw state; feeding it back to [`FastRng::new`] resumes the sequence.
    pub fn state(&self) -> u64 {
        self.seed
    }

    #[inline(always)]
    fn step(&mut self) -> u64 {
        self.seed = PRN_MULT.wrapping_mul(self.seed).wrapping_add(PRN_ADD);

        // RXS-M-XS output permutation
        let word = ((self.seed >> ((self.seed >> 59) + 5)) ^ self.seed)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }
}

/// LCG state after `n` steps from `seed`, by binary decomposition of the
/// affine map `s -> g*s + c` (F. Brown, "Random number generation with
/// arbitrary strides", 1994).
fn future_seed(mut n: u64, seed: u64) -> u64 {
    let mut g = PRN_MULT;
    let mut c = PRN_ADD;
    let mut g_new: u64 = 1;
    let mut c_new: u64 = 0;
    while n > 0 {
        if n & 1 == 1 {
            g_new = g_new.wrapping_mul(g);
            c_new = c_new.wrapping_mul(g).wrapping_add(c);
        }
        c = c.wrapping_mul(g.wrapping_add(1));
        g = g.wrapping_mul(g);
        n >>= 1;
    }
    g_new.wrapping_mul(seed).wrapping_add(c_new)
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            seed: u64::from_le_bytes(seed),
        }
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut left = dest;
        while left.len() >= 8 {
            let bytes = self.next_u64().to_le_bytes();
            left[..8].copy_from_slice(&bytes);
            left = &mut left[8..];
        }
        if !left.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            left.copy_from_slice(&bytes[..left.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
