//! # Resource Guards
//!
//! Stateless ceilings applied before any state is touched.
//!
//! | Guard | Bound | Error |
//! |-------|-------|-------|
//! | Calldata | `len(calldata) <= max_calldata_size` | `CalldataTooLarge` |
//! | Data sources | `count <= max_data_source_count_per_request` | `TooManyDataSources` |
//! | Execute gas | `execute_gas <= end_block_execute_gas_limit` | `ExecuteGasTooHigh` |

use super::entities::Params;
use super::errors::{OracleError, OracleResult};
use super::value_objects::RequestId;

/// Reject calldata longer than `max_calldata_size`.
pub fn check_calldata_size(calldata: &[u8], params: &Params) -> OracleResult<()> {
    if calldata.len() as u64 > params.max_calldata_size {
        return Err(OracleError::CalldataTooLarge {
            size: calldata.len(),
            max: params.max_calldata_size,
        });
    }
    Ok(())
}

/// Reject a request whose raw data request count exceeds the per-request bound.
///
/// `count` is the number of entries attached, including any being attached now.
pub fn check_data_source_count(
    request_id: RequestId,
    count: u64,
    params: &Params,
) -> OracleResult<()> {
    if count > params.max_data_source_count_per_request {
        return Err(OracleError::TooManyDataSources {
            request_id,
            count,
            max: params.max_data_source_count_per_request,
        });
    }
    Ok(())
}

/// Reject an execute gas declaration the end-block budget cannot cover.
pub fn check_execute_gas(execute_gas: u64, params: &Params) -> OracleResult<()> {
    if execute_gas > params.end_block_execute_gas_limit {
        return Err(OracleError::ExecuteGasTooHigh {
            requested: execute_gas,
            limit: params.end_block_execute_gas_limit,
        });
    }
    Ok(())
}

/// `1 <= min_count <= ask_count`.
pub fn check_min_count(ask_count: u64, min_count: u64) -> OracleResult<()> {
    if min_count == 0 || min_count > ask_count {
        return Err(OracleError::InvalidMinCount {
            min_count,
            ask_count,
        });
    }
    Ok(())
}
