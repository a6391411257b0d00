//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. Every shuffle in a session draws
//! from one of these, so a session replays identically from its seed.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use word_jumble::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, so sequential
    /// seeds still produce unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Xorshift must never sit in the all-zero state
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Split off an independent child generator.
    ///
    /// Used to hand each round its own stream without sharing state.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u64())
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Modulo bias is irrelevant at word lengths
        (self.next_u64() % max as u64) as u32
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// A 64-bit seed taken from a freshly generated v4 UUID.
pub fn entropy_seed() -> u64 {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(seed)
}

/// Derive the seed for one session.
///
/// Mixes the process-wide base seed with the session id and the
/// normalized theme, so two sessions never share a shuffle stream while a
/// recorded `(base_seed, session_id, theme)` triple still replays exactly.
pub fn derive_session_seed(base_seed: u64, session_id: &[u8; 16], theme: &str) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"WORD_JUMBLE_SESSION_V1");
    hasher.update(base_seed.to_le_bytes());
    hasher.update(session_id);
    hasher.update(theme.trim().to_lowercase().as_bytes());

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(7) < 7);
        }

        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = DeterministicRng::new(1111);
        let mut letters: Vec<char> = "dolphin".chars().collect();
        rng.shuffle(&mut letters);

        let mut sorted = letters.clone();
        sorted.sort_unstable();
        let mut expected: Vec<char> = "dolphin".chars().collect();
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut rng1 = DeterministicRng::new(1111);
        let mut rng2 = DeterministicRng::new(1111);

        let mut arr1: Vec<char> = "jellyfish".chars().collect();
        let mut arr2 = arr1.clone();

        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);

        assert_eq!(arr1, arr2);
    }

    #[test]
    fn test_fork_is_independent_but_reproducible() {
        let mut parent1 = DeterministicRng::new(77);
        let mut parent2 = DeterministicRng::new(77);

        let mut child1 = parent1.fork();
        let mut child2 = parent2.fork();
        assert_eq!(child1.next_u64(), child2.next_u64());

        // The parent stream moved on past the fork
        let mut fresh = DeterministicRng::new(77);
        fresh.next_u64();
        assert_eq!(parent1.next_u64(), fresh.next_u64());
    }

    #[test]
    fn test_derive_session_seed() {
        let session = [1u8; 16];

        let seed1 = derive_session_seed(42, &session, "Ocean Life");
        let seed2 = derive_session_seed(42, &session, "  ocean life ");
        assert_eq!(seed1, seed2, "theme is normalized before hashing");

        let seed3 = derive_session_seed(42, &[2u8; 16], "Ocean Life");
        assert_ne!(seed1, seed3);

        let seed4 = derive_session_seed(43, &session, "Ocean Life");
        assert_ne!(seed1, seed4);
    }}
