//! # Execution Context
//!
//! Block position and gas budget of the call being processed.

use super::gas::GasMeter;
use shared_types::BlockHeader;

/// Per-call context handed to every lifecycle operation.
#[derive(Clone, Debug)]
pub struct Context {
    pub block_height: u64,
    pub block_time: u64,
    pub gas_meter: GasMeter,
}

impl Context {
    /// Context for a transaction with the given gas limit.
    pub fn new(block_height: u64, block_time: u64, gas_limit: u64) -> Self {
        Self {
            block_height,
            block_time,
            gas_meter: GasMeter::new(gas_limit),
        }
    }

    /// Unmetered context for block hooks.
    pub fn for_block(header: &BlockHeader) -> Self {
        Self {
            block_height: header.height,
            block_time: header.timestamp,
            gas_meter: GasMeter::infinite(),
        }
    }
}
