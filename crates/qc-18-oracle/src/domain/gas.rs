//! # Gas Metering
//!
//! The caller-side resource budget charged by lifecycle operations.
//!
//! Oracle scripts run during end-of-block processing, outside any
//! transaction's budget, so admission pre-charges the declared execute gas
//! against the submitting transaction.

use super::errors::{OracleError, OracleResult};

// =============================================================================
// COST TABLE
// =============================================================================

/// Gas costs for store writes made by lifecycle operations.
pub mod costs {
    /// Flat cost per staged key write.
    pub const WRITE_COST_FLAT: u64 = 2_000;
    /// Cost per byte of staged key and value.
    pub const WRITE_COST_PER_BYTE: u64 = 30;
}

/// Storage cost of `writes` staged keys totalling `bytes` bytes.
#[must_use]
pub fn storage_write_cost(writes: u64, bytes: u64) -> u64 {
    writes
        .saturating_mul(costs::WRITE_COST_FLAT)
        .saturating_add(bytes.saturating_mul(costs::WRITE_COST_PER_BYTE))
}

// =============================================================================
// GAS METER
// =============================================================================

/// Tracks gas consumed against a limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    /// A meter that fails once `limit` is exceeded.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    /// A meter with no practical ceiling, used for end-of-block processing.
    #[must_use]
    pub const fn infinite() -> Self {
        Self::new(u64::MAX)
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed)
    }

    /// Consume `amount`. On failure `consumed` is left unchanged.
    pub fn consume(&mut self, amount: u64, descriptor: &'static str) -> OracleResult<()> {
        if amount > self.remaining() {
            return Err(OracleError::OutOfGas {
                required: amount,
                remaining: self.remaining(),
                descriptor,
            });
        }
        self.consumed += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_meter_consume() {
        let mut gas = GasMeter::new(1000);
        assert_eq!(gas.remaining(), 1000);

        gas.consume(500, "test").unwrap();
        assert_eq!(gas.consumed(), 500);
        assert_eq!(gas.remaining(), 500);

        assert!(matches!(
            gas.consume(600, "test"),
            Err(OracleError::OutOfGas {
                required: 600,
                remaining: 500,
                ..
            })
        ));
        assert_eq!(gas.consumed(), 500);
    }

    #[test]
    fn test_infinite_meter() {
        let mut gas = GasMeter::infinite();
        gas.consume(u64::MAX / 2, "big").unwrap();
        assert!(gas.remaining() > 0);
    }

    #[test]
    fn test_storage_write_cost() {
        assert_eq!(storage_write_cost(0, 0), 0);
        assert_eq!(
            storage_write_cost(2, 10),
            2 * costs::WRITE_COST_FLAT + 10 * costs::WRITE_COST_PER_BYTE
        );
        assert_eq!(storage_write_cost(u64::MAX, u64::MAX), u64::MAX);
    }
}
