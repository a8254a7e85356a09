//! # Error Types
//!
//! All error types for the oracle request lifecycle.
//!
//! Every `OracleError` carries a stable numeric [`ErrorCode`] for callers and
//! an [`ErrorKind`] placing it in the rejection taxonomy. Rejected operations
//! never mutate state.

use super::value_objects::{Address, DataSourceId, ExternalId, OracleScriptId, RequestId};
use shared_types::KVStoreError;
use thiserror::Error;

// =============================================================================
// TAXONOMY
// =============================================================================

/// Coarse classification of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced request, script or data source does not exist.
    NotFound,
    /// Input violates a configured bound or a precondition.
    Validation,
    /// Operation would duplicate an already recorded fact.
    Conflict,
    /// Oracle script fault or gas exhaustion during resolution.
    ExecutionFailure,
    /// Caller lacks the privilege for the operation.
    Unauthorized,
    /// Backing store or codec failure.
    Storage,
}

/// Stable error codes exposed to transaction callers.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    RequestNotFound = 101,
    OracleScriptNotFound = 102,
    DataSourceNotFound = 103,
    CalldataTooLarge = 201,
    TooManyDataSources = 202,
    ExecuteGasTooHigh = 203,
    InsufficientValidators = 204,
    InvalidMinCount = 205,
    InvalidValidator = 206,
    UnknownExternalId = 207,
    IncompleteReports = 208,
    OutOfGas = 209,
    InvalidParams = 210,
    DuplicateValidator = 301,
    DuplicateRequest = 302,
    DuplicateExternalId = 303,
    RequestAlreadyResolved = 304,
    RawRequestsSealed = 305,
    Unauthorized = 401,
    Storage = 501,
    Codec = 502,
}

// =============================================================================
// ORACLE ERRORS
// =============================================================================

/// Errors rejected synchronously by a lifecycle operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("oracle script not found: {0}")]
    OracleScriptNotFound(OracleScriptId),

    #[error("data source not found: {0}")]
    DataSourceNotFound(DataSourceId),

    #[error("calldata too large: {size} > {max} bytes")]
    CalldataTooLarge { size: usize, max: u64 },

    #[error("too many data sources for request {request_id}: {count} > {max}")]
    TooManyDataSources {
        request_id: RequestId,
        count: u64,
        max: u64,
    },

    #[error("execute gas exceeds end-block limit: {requested} > {limit}")]
    ExecuteGasTooHigh { requested: u64, limit: u64 },

    #[error("insufficient active validators: requested {requested}, available {available}")]
    InsufficientValidators { requested: u64, available: u64 },

    #[error("invalid min count {min_count} for ask count {ask_count}")]
    InvalidMinCount { min_count: u64, ask_count: u64 },

    #[error("validator {validator:?} was not requested for request {request_id}")]
    InvalidValidator {
        request_id: RequestId,
        validator: Address,
    },

    #[error("validator {validator:?} already reported for request {request_id}")]
    DuplicateValidator {
        request_id: RequestId,
        validator: Address,
    },

    #[error("request {0} is already in the pending resolve list")]
    DuplicateRequest(RequestId),

    #[error("external id {external_id} already used by request {request_id}")]
    DuplicateExternalId {
        request_id: RequestId,
        external_id: ExternalId,
    },

    #[error("external id {external_id} has no raw data request in request {request_id}")]
    UnknownExternalId {
        request_id: RequestId,
        external_id: ExternalId,
    },

    #[error("incomplete reports for request {request_id}: expected {expected}, got {got}")]
    IncompleteReports {
        request_id: RequestId,
        expected: usize,
        got: usize,
    },

    #[error("request {0} is already resolved")]
    RequestAlreadyResolved(RequestId),

    #[error("request {0} already has reports; raw data requests are sealed")]
    RawRequestsSealed(RequestId),

    #[error("out of gas: required {required}, remaining {remaining} ({descriptor})")]
    OutOfGas {
        required: u64,
        remaining: u64,
        descriptor: &'static str,
    },

    #[error("unauthorized: {0:?} is not the params authority")]
    Unauthorized(Address),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("storage error: {0}")]
    Storage(#[from] KVStoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

impl OracleError {
    /// Stable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RequestNotFound(_) => ErrorCode::RequestNotFound,
            Self::OracleScriptNotFound(_) => ErrorCode::OracleScriptNotFound,
            Self::DataSourceNotFound(_) => ErrorCode::DataSourceNotFound,
            Self::CalldataTooLarge { .. } => ErrorCode::CalldataTooLarge,
            Self::TooManyDataSources { .. } => ErrorCode::TooManyDataSources,
            Self::ExecuteGasTooHigh { .. } => ErrorCode::ExecuteGasTooHigh,
            Self::InsufficientValidators { .. } => ErrorCode::InsufficientValidators,
            Self::InvalidMinCount { .. } => ErrorCode::InvalidMinCount,
            Self::InvalidValidator { .. } => ErrorCode::InvalidValidator,
            Self::DuplicateValidator { .. } => ErrorCode::DuplicateValidator,
            Self::DuplicateRequest(_) => ErrorCode::DuplicateRequest,
            Self::DuplicateExternalId { .. } => ErrorCode::DuplicateExternalId,
            Self::UnknownExternalId { .. } => ErrorCode::UnknownExternalId,
            Self::IncompleteReports { .. } => ErrorCode::IncompleteReports,
            Self::RequestAlreadyResolved(_) => ErrorCode::RequestAlreadyResolved,
            Self::RawRequestsSealed(_) => ErrorCode::RawRequestsSealed,
            Self::OutOfGas { .. } => ErrorCode::OutOfGas,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::Storage(_) => ErrorCode::Storage,
            Self::Codec(_) => ErrorCode::Codec,
        }
    }

    /// Taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestNotFound(_)
            | Self::OracleScriptNotFound(_)
            | Self::DataSourceNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateValidator { .. }
            | Self::DuplicateRequest(_)
            | Self::DuplicateExternalId { .. }
            | Self::RequestAlreadyResolved(_)
            | Self::RawRequestsSealed(_) => ErrorKind::Conflict,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Storage(_) | Self::Codec(_) => ErrorKind::Storage,
            _ => ErrorKind::Validation,
        }
    }
}

impl From<bincode::Error> for OracleError {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

// =============================================================================
// EXECUTION FAILURES
// =============================================================================

/// Failure reported by the oracle-script execution environment.
///
/// Recorded as the request's resolution outcome; never propagated out of
/// end-of-block processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// The script trapped or returned an error.
    #[error("script fault: {0}")]
    ScriptFault(String),

    /// The script needed more than its declared execute gas.
    #[error("out of execute gas: used {used} > limit {limit}")]
    OutOfGas { used: u64, limit: u64 },

    /// The referenced script is no longer registered.
    #[error("oracle script not found: {0}")]
    ScriptNotFound(OracleScriptId),
}

impl ExecutionFailure {
    /// Always [`ErrorKind::ExecutionFailure`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExecutionFailure
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OracleError::CalldataTooLarge { size: 8, max: 0 };
        assert_eq!(err.to_string(), "calldata too large: 8 > 0 bytes");

        let err = OracleError::RequestNotFound(RequestId(2));
        assert_eq!(err.to_string(), "request not found: 2");
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ErrorCode::RequestNotFound as u32, 101);
        assert_eq!(ErrorCode::InvalidValidator as u32, 206);
        assert_eq!(ErrorCode::DuplicateValidator as u32, 301);
        assert_eq!(ErrorCode::DuplicateRequest as u32, 302);
        assert_eq!(ErrorCode::RawRequestsSealed as u32, 305);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            OracleError::RequestNotFound(RequestId(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OracleError::ExecuteGasTooHigh {
                requested: 2,
                limit: 1
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            OracleError::DuplicateRequest(RequestId(1)).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            OracleError::RawRequestsSealed(RequestId(1)).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            OracleError::Storage(KVStoreError::NotFound).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            ExecutionFailure::ScriptFault("trap".into()).kind(),
            ErrorKind::ExecutionFailure
        );
    }

    #[test]
    fn test_kv_error_conversion() {
        let err: OracleError = KVStoreError::CorruptionError {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Storage);
    }
}
