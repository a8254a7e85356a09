//! # Rolling Seed
//!
//! Sampling entropy that advances once per block.
//!
//! ## Update Rule
//!
//! ```text
//! before: [s0, s1, ..., s31]
//! after:  [s1, ..., s31, hash[0]]
//! ```
//!
//! The byte appended at block N comes from block N's finalized hash, which no
//! request submitter or validator knows before that block commits. Requests
//! admitted in block N therefore cannot pick their content to steer which
//! validators get sampled.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Length of the rolling seed buffer in bytes.
pub const ROLLING_SEED_SIZE: usize = 32;

/// Fixed-length, block-advancing entropy buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingSeed([u8; ROLLING_SEED_SIZE]);

impl RollingSeed {
    /// Zero-filled seed written at genesis.
    #[must_use]
    pub const fn init() -> Self {
        Self([0u8; ROLLING_SEED_SIZE])
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; ROLLING_SEED_SIZE]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ROLLING_SEED_SIZE] {
        &self.0
    }

    /// Drop the oldest byte and append the first byte of `block_hash`.
    pub fn update(&mut self, block_hash: &Hash) {
        self.0.rotate_left(1);
        self.0[ROLLING_SEED_SIZE - 1] = block_hash[0];
    }
}

impl Default for RollingSeed {
    fn default() -> Self {
        Self::init()
    }
}
