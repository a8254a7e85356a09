//! Request state machine primitives.
//!
//! Each function reads and writes through the store it is handed. The keeper
//! passes a [`CacheStore`](crate::store::CacheStore) overlay and commits only
//! if the whole operation succeeded.
//!
//! ```text
//! Admitted -> Reporting -> PendingResolve -> Resolved
//!     \           \              \
//!      +-----------+--------------+-------> Expired
//! ```

use crate::domain::invariants::{check_pending_list_invariant, check_request_invariants};
use crate::domain::{
    guards, short_address, Address, Context, ExecutionFailure, OracleError, OracleResult,
    Params, Request, RequestId, RequestResult, ResolveStatus, ValidatorReport,
};
use crate::ports::{ExecutionInput, KeyValueStore, OracleScriptExecutor};
use crate::store::RequestStore;
use tracing::{debug, warn};

/// Log and debug-assert on a request that broke its invariants.
fn audit_request(request: &Request) {
    let violations = check_request_invariants(request);
    if !violations.is_empty() {
        warn!(request_id = %request.id, ?violations, "request invariant violated");
        debug_assert!(violations.is_empty(), "request invariant violated: {violations:?}");
    }
}

/// Append `validator` to the request's received validators.
///
/// # Errors
///
/// `RequestNotFound`, `InvalidValidator` if `validator` was not sampled, and
/// `DuplicateValidator` if it already reported.
pub fn add_received_validator<K: KeyValueStore + ?Sized>(
    store: &mut K,
    request_id: RequestId,
    validator: &Address,
) -> OracleResult<Request> {
    let mut request = store.get_request(request_id)?;
    if !request.is_requested(validator) {
        return Err(OracleError::InvalidValidator {
            request_id,
            validator: *validator,
        });
    }
    if request.has_reported(validator) {
        return Err(OracleError::DuplicateValidator {
            request_id,
            validator: *validator,
        });
    }

    request.received_validators.push(*validator);
    audit_request(&request);
    store.set_request(&request)?;

    debug!(
        request_id = %request_id,
        validator = %short_address(validator),
        received = request.received_validators.len(),
        "validator report accepted"
    );
    Ok(request)
}

/// True exactly when the received count equals the threshold.
///
/// Called right after each accepted report, this fires once per request: on
/// the report that first reaches `sufficient_validator_count`. Unknown
/// requests are never promotable.
pub fn should_promote_to_pending<K: KeyValueStore + ?Sized>(
    store: &K,
    request_id: RequestId,
) -> OracleResult<bool> {
    match store.get_request(request_id) {
        Ok(request) => {
            Ok(request.received_validators.len() as u64 == request.sufficient_validator_count)
        }
        Err(OracleError::RequestNotFound(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Queue `request_id` for end-of-block resolution.
///
/// # Errors
///
/// `DuplicateRequest` if the id is already queued.
pub fn add_to_pending_list<K: KeyValueStore + ?Sized>(
    store: &mut K,
    request_id: RequestId,
) -> OracleResult<()> {
    let mut list = store.get_pending_resolve_list()?;
    if list.contains(&request_id) {
        return Err(OracleError::DuplicateRequest(request_id));
    }
    list.push(request_id);
    debug_assert!(check_pending_list_invariant(&list).is_empty());
    store.set_pending_resolve_list(&list)?;
    Ok(())
}

/// Re-check the data source count guard against what is stored for the request.
pub fn validate_data_source_count<K: KeyValueStore + ?Sized>(
    store: &K,
    request_id: RequestId,
    params: &Params,
) -> OracleResult<()> {
    let count = store.raw_data_request_count(request_id)?;
    guards::check_data_source_count(request_id, count, params)
}

/// Mark a request resolved.
///
/// # Errors
///
/// `RequestNotFound`, or `RequestAlreadyResolved` if already terminal.
pub fn set_resolved<K: KeyValueStore + ?Sized>(
    store: &mut K,
    request_id: RequestId,
) -> OracleResult<Request> {
    let mut request = store.get_request(request_id)?;
    if request.is_resolved {
        return Err(OracleError::RequestAlreadyResolved(request_id));
    }
    request.is_resolved = true;
    store.set_request(&request)?;
    store.unindex_expiry(request.expiration_height, request_id)?;
    Ok(request)
}

/// Reports of every received validator, in arrival order.
fn gather_reports<K: KeyValueStore + ?Sized>(
    store: &K,
    request: &Request,
) -> OracleResult<Vec<ValidatorReport>> {
    request
        .received_validators
        .iter()
        .map(|validator| {
            Ok(ValidatorReport {
                validator: *validator,
                reports: store.get_reports(request.id, validator)?,
            })
        })
        .collect()
}

/// Run the oracle script for a pending request and record the outcome.
///
/// Script faults and gas exhaustion become a `Failure` result; only storage
/// and codec errors are returned. Returns `None` if the request had already
/// reached a terminal state.
pub fn resolve<K, E>(
    store: &mut K,
    executor: &E,
    ctx: &Context,
    request_id: RequestId,
) -> OracleResult<Option<RequestResult>>
where
    K: KeyValueStore + ?Sized,
    E: OracleScriptExecutor + ?Sized,
{
    let request = store.get_request(request_id)?;
    if request.is_resolved {
        warn!(request_id = %request_id, "pending request already resolved; skipping");
        return Ok(None);
    }

    let input = ExecutionInput {
        request_id,
        oracle_script_id: request.oracle_script_id,
        calldata: request.calldata.clone(),
        execute_gas: request.execute_gas,
        raw_requests: store.get_raw_data_requests(request_id)?,
        reports: gather_reports(store, &request)?,
    };

    let outcome = match store.get_oracle_script(request.oracle_script_id) {
        Ok(script) => executor.execute(&script, &input).and_then(|output| {
            if output.gas_used > request.execute_gas {
                Err(ExecutionFailure::OutOfGas {
                    used: output.gas_used,
                    limit: request.execute_gas,
                })
            } else {
                Ok(output)
            }
        }),
        Err(OracleError::OracleScriptNotFound(id)) => Err(ExecutionFailure::ScriptNotFound(id)),
        Err(err) => return Err(err),
    };

    let mut result = RequestResult {
        request_id,
        status: ResolveStatus::Success,
        result: Vec::new(),
        reason: None,
        gas_used: 0,
        report_count: request.received_validators.len() as u64,
        resolve_height: ctx.block_height,
        resolve_time: ctx.block_time,
    };
    match outcome {
        Ok(output) => {
            result.result = output.result;
            result.gas_used = output.gas_used;
        }
        Err(failure) => {
            warn!(request_id = %request_id, error = %failure, "oracle script failed");
            if let ExecutionFailure::OutOfGas { used, .. } = failure {
                result.gas_used = used.min(request.execute_gas);
            }
            result.status = ResolveStatus::Failure;
            result.reason = Some(failure.to_string());
        }
    }

    set_resolved(store, request_id)?;
    store.set_result(&result)?;
    Ok(Some(result))
}

/// Terminate every unresolved request whose expiration height is at or
/// below `height`, in `(expiration_height, id)` order.
pub fn sweep_expired<K: KeyValueStore + ?Sized>(
    store: &mut K,
    ctx: &Context,
) -> OracleResult<Vec<RequestResult>> {
    let height = ctx.block_height;
    let mut expired = Vec::new();

    for (expiration_height, request_id) in store.due_expirations(height)? {
        let request = store.get_request(request_id)?;
        if request.is_resolved {
            store.unindex_expiry(expiration_height, request_id)?;
            continue;
        }

        set_resolved(store, request_id)?;
        let result = RequestResult {
            request_id,
            status: ResolveStatus::Expired,
            result: Vec::new(),
            reason: Some(format!("expired at height {height}")),
            gas_used: 0,
            report_count: request.received_validators.len() as u64,
            resolve_height: height,
            resolve_time: ctx.block_time,
        };
        store.set_result(&result)?;
        expired.push(result);
    }

    Ok(expired)
}
