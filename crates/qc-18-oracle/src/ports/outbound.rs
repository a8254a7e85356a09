//! # Driven Ports (Outbound)
//!
//! Interfaces the oracle subsystem depends on. The host node provides:
//! - the ordered key-value store holding all oracle state
//! - the active validator set with voting power
//! - the oracle-script execution environment

use crate::domain::{
    ExecutionFailure, ExternalId, OracleScript, OracleScriptId, RawDataRequest, RequestId,
    ValidatorReport,
};
use shared_types::{KVStoreError, Validator};

// =============================================================================
// KEY-VALUE STORE
// =============================================================================

/// Result of a prefix scan, ordered by ascending key.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Ordered key-value storage.
///
/// Testing: `InMemoryKVStore` (adapters/memory_store.rs)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All pairs whose key starts with `prefix`, in ascending key order.
    ///
    /// Replicas iterate state in this order, so implementations must not
    /// return hash-map order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

// =============================================================================
// VALIDATOR SET
// =============================================================================

/// Snapshot of the staking module's validator set.
pub trait ValidatorSetProvider: Send + Sync {
    /// All bonded validators with their voting power. Inactive entries are
    /// ignored by the sampler.
    fn validators(&self) -> Vec<Validator>;
}

// =============================================================================
// ORACLE SCRIPT EXECUTION
// =============================================================================

/// Input handed to the execution environment when a request resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionInput {
    pub request_id: RequestId,
    pub oracle_script_id: OracleScriptId,
    pub calldata: Vec<u8>,
    pub execute_gas: u64,
    /// Raw data requests attached to the request, by external id.
    pub raw_requests: Vec<(ExternalId, RawDataRequest)>,
    /// One entry per received validator, in arrival order.
    pub reports: Vec<ValidatorReport>,
}

/// Successful script output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub result: Vec<u8>,
    pub gas_used: u64,
}

/// The oracle-script execution environment.
///
/// Must be deterministic and must not run past `input.execute_gas`.
pub trait OracleScriptExecutor: Send + Sync {
    fn execute(
        &self,
        script: &OracleScript,
        input: &ExecutionInput,
    ) -> Result<ExecutionOutput, ExecutionFailure>;
}
