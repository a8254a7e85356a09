//! # Domain Entities
//!
//! Requests, raw data requests and reports, resolution results, registry
//! entries and module parameters.

use super::value_objects::{Address, DataSourceId, ExternalId, OracleScriptId, RequestId};
use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST
// =============================================================================

/// A data request awaiting reports from its sampled validators.
///
/// Everything except `received_validators` and `is_resolved` is fixed at
/// admission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Sequential id assigned at admission.
    pub id: RequestId,
    /// Script run against the aggregated reports.
    pub oracle_script_id: OracleScriptId,
    /// Opaque script input.
    pub calldata: Vec<u8>,
    /// Validators sampled at admission, in sampler order.
    pub requested_validators: Vec<Address>,
    /// Number of distinct reports that makes the request resolvable (`min_count`).
    pub sufficient_validator_count: u64,
    /// Validators that have reported, in arrival order.
    pub received_validators: Vec<Address>,
    /// Block height at admission.
    pub request_height: u64,
    /// Block time at admission.
    pub request_time: u64,
    /// `request_height + expiration_block_count`.
    pub expiration_height: u64,
    /// Declared resolution budget, pre-charged at admission.
    pub execute_gas: u64,
    /// Set exactly once, by resolution or expiry.
    pub is_resolved: bool,
}

impl Request {
    /// Create a freshly admitted request with no reports.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RequestId,
        oracle_script_id: OracleScriptId,
        calldata: Vec<u8>,
        requested_validators: Vec<Address>,
        sufficient_validator_count: u64,
        request_height: u64,
        request_time: u64,
        expiration_height: u64,
        execute_gas: u64,
    ) -> Self {
        Self {
            id,
            oracle_script_id,
            calldata,
            requested_validators,
            sufficient_validator_count,
            received_validators: Vec::new(),
            request_height,
            request_time,
            expiration_height,
            execute_gas,
            is_resolved: false,
        }
    }

    /// Number of sampled validators (`ask_count`).
    #[must_use]
    pub fn ask_count(&self) -> u64 {
        self.requested_validators.len() as u64
    }

    /// Whether `validator` was sampled for this request.
    #[must_use]
    pub fn is_requested(&self, validator: &Address) -> bool {
        self.requested_validators.contains(validator)
    }

    /// Whether `validator` has already reported.
    #[must_use]
    pub fn has_reported(&self, validator: &Address) -> bool {
        self.received_validators.contains(validator)
    }

    /// Whether the request is past its expiration height at `height`.
    #[must_use]
    pub fn is_expired_at(&self, height: u64) -> bool {
        self.expiration_height <= height
    }
}

// =============================================================================
// RAW DATA
// =============================================================================

/// Request-specific input for one data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataRequest {
    pub data_source_id: DataSourceId,
    pub calldata: Vec<u8>,
}

impl RawDataRequest {
    pub fn new(data_source_id: DataSourceId, calldata: Vec<u8>) -> Self {
        Self {
            data_source_id,
            calldata,
        }
    }
}

/// One validator's answer for one raw data request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataReport {
    pub external_id: ExternalId,
    /// Exit code of the data source run; zero means success.
    pub exit_code: u8,
    pub data: Vec<u8>,
}

impl RawDataReport {
    pub fn new(external_id: ExternalId, exit_code: u8, data: Vec<u8>) -> Self {
        Self {
            external_id,
            exit_code,
            data,
        }
    }
}

/// All raw reports from one validator, as handed to the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorReport {
    pub validator: Address,
    pub reports: Vec<RawDataReport>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// A registered oracle script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleScript {
    pub owner: Address,
    pub name: String,
    pub code: Vec<u8>,
}

/// A registered data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub owner: Address,
    pub name: String,
    pub executable: Vec<u8>,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Terminal outcome of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveStatus {
    /// The script ran and produced a result.
    Success,
    /// The script faulted or ran out of gas.
    Failure,
    /// The expiration height was reached before resolution.
    Expired,
}

impl ResolveStatus {
    /// Label used for log fields and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Expired => "expired",
        }
    }
}

/// Recorded outcome of a resolved or expired request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResult {
    pub request_id: RequestId,
    pub status: ResolveStatus,
    /// Script output; empty unless `status` is `Success`.
    pub result: Vec<u8>,
    /// Failure description for `Failure` and `Expired`.
    pub reason: Option<String>,
    /// Execute gas the script reported using.
    pub gas_used: u64,
    pub report_count: u64,
    pub resolve_height: u64,
    pub resolve_time: u64,
}

// =============================================================================
// PARAMS
// =============================================================================

/// Module parameters. Read-only to the lifecycle; changed only through the
/// privileged params update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub max_calldata_size: u64,
    pub max_data_source_count_per_request: u64,
    pub end_block_execute_gas_limit: u64,
    /// Used when a request does not name its own expiration block count.
    pub expiration_block_count: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_calldata_size: 1024,
            max_data_source_count_per_request: 16,
            end_block_execute_gas_limit: 1_000_000,
            expiration_block_count: 100,
        }
    }
}

impl Params {
    /// Reject parameter sets the lifecycle cannot operate under.
    pub fn validate(&self) -> Result<(), String> {
        if self.expiration_block_count == 0 {
            return Err("expiration_block_count must be positive".to_string());
        }
        Ok(())
    }
}
