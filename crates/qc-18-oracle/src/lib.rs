//! # qc-18-oracle
//!
//! Oracle request lifecycle subsystem for Quantum-Chain.
//!
//! ## Architecture
//!
//! A client submits a data request; a validator subset sampled by voting
//! power answers it. Once enough reports arrive the request is queued and
//! resolved at the end of the block by running its oracle script.
//!
//! ```text
//! begin_block ──seed.update(hash)──→ [RollingSeed]
//!                                         │
//! add_request ──guards──sample──────────→ [Request] ──expiry index
//!                                         │
//! report_data ──add_received_validator──→ threshold? ──→ [PendingResolveList]
//!                                                              │
//! end_block ──resolve(pending)──clear──sweep_expired──→ [RequestResult]
//! ```
//!
//! ### Determinism
//!
//! Every replica must reach byte-identical state. State lives in an ordered
//! key-value store, iteration is by key order, and sampling sorts by
//! `(power desc, address asc)` before drawing.
//!
//! ### Atomicity
//!
//! Each entry point stages writes in a `CacheStore` overlay and commits one
//! atomic batch. Rejected calls write nothing and emit nothing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc_18_oracle::{OracleKeeper, OracleDependencies, RequestMsg, OracleApi, BlockHooks};
//!
//! let mut keeper = OracleKeeper::new(OracleDependencies {
//!     store,
//!     validators,
//!     executor,
//!     authority,
//! });
//!
//! keeper.begin_block(&header)?;
//! let id = keeper.add_request(&mut ctx, RequestMsg::new(script_id, calldata, 4, 3, 0, 50_000))?;
//! keeper.report_data(&mut ctx, id, validator, reports)?;
//! let summary = keeper.end_block(&Context::for_block(&header))?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod hooks;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod store;

/// Subsystem identifier within the node.
pub const SUBSYSTEM_ID: u8 = 18;

// Re-export main types
pub use adapters::{InMemoryKVStore, StaticValidatorSet};
pub use config::{ConfigError, GenesisState, OracleConfig};
pub use domain::{
    Context, DataSource, DataSourceId, ErrorCode, ErrorKind, ExecutionFailure, ExternalId,
    GasMeter, OracleError, OracleResult, OracleScript, OracleScriptId, Params, RawDataReport,
    RawDataRequest, Request, RequestId, RequestResult, ResolveStatus, RollingSeed,
};
pub use events::OracleEvent;
pub use ports::{
    BlockHooks, EndBlockSummary, ExecutionInput, ExecutionOutput, KeyValueStore, OracleApi,
    OracleScriptExecutor, RequestMsg, ValidatorSetProvider,
};
pub use service::{OracleDependencies, OracleKeeper};
pub use store::RequestStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = Params::default();
        assert_eq!(params.max_calldata_size, 1024);
        assert_eq!(params.max_data_source_count_per_request, 16);
        assert_eq!(params.end_block_execute_gas_limit, 1_000_000);
        assert_eq!(params.expiration_block_count, 100);
    }

    #[test]
    fn test_subsystem_id() {
        assert_eq!(SUBSYSTEM_ID, 18);
    }
}
