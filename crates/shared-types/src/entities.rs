//! # Core Domain Entities
//!
//! Chain-level entities handed across subsystem boundaries.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`
//! - **Consensus**: `Validator`

use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 20-byte account or validator address.
pub type Address = [u8; 20];

/// The header of a finalized block, as delivered to begin-block hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block height in the chain.
    pub height: u64,
    /// Unix timestamp when the block was proposed.
    pub timestamp: u64,
    /// Finalized hash of this block.
    pub hash: Hash,
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// The validator who proposed this block.
    pub proposer: Address,
}

impl BlockHeader {
    /// Build a header and derive its hash from the remaining fields.
    pub fn new(height: u64, timestamp: u64, parent_hash: Hash, proposer: Address) -> Self {
        let mut header = Self {
            height,
            timestamp,
            hash: [0u8; 32],
            parent_hash,
            proposer,
        };
        header.hash = header.compute_hash();
        header
    }

    /// SHA-256 over height, timestamp, parent hash and proposer.
    pub fn compute_hash(&self) -> Hash {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.proposer);
        hasher.finalize().into()
    }
}

// =============================================================================
// CLUSTER B: CONSENSUS
// =============================================================================

/// A validator in the consensus protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// The validator's operator address (identity).
    pub address: Address,
    /// Voting power.
    pub power: u64,
    /// Whether this validator is currently in the active set.
    pub active: bool,
}

impl Validator {
    /// Create an active validator.
    pub fn new(address: Address, power: u64) -> Self {
        Self {
            address,
            power,
            active: true,
        }
    }
}
