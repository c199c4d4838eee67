//! Seedable RNG for board layouts.
//!
//! Uses ChaCha8: a portable, value-stable stream, so a seed always deals the
//! same board on every platform and across crate upgrades. Layout code takes
//! any [`rand::Rng`]; this alias is the one the game uses by default.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The RNG used to deal boards.
pub type BoardRng = ChaCha8Rng;

/// Create a board RNG from a 64-bit seed.
pub fn seeded(seed: u64) -> BoardRng {
    ChaCha8Rng::seed_from_u64(seed)
}
