//! # Domain Invariants
//!
//! Runtime checks of the request and pending-list invariants.
//!
//! - INVARIANT-1: `received_validators` is a subset of `requested_validators`
//! - INVARIANT-2: `received_validators` has no duplicates
//! - INVARIANT-3: `sufficient_validator_count <= ask_count`
//! - INVARIANT-4: the pending resolve list has no duplicates

use super::entities::Request;
use super::value_objects::{Address, RequestId};
use std::collections::HashSet;

/// A violated invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    UnrequestedReporter(Address),
    DuplicateReporter(Address),
    ThresholdAboveAskCount { sufficient: u64, ask_count: u64 },
    DuplicatePendingEntry(RequestId),
}

/// Check INVARIANT-1 through INVARIANT-3 for one request.
#[must_use]
pub fn check_request_invariants(request: &Request) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for validator in &request.received_validators {
        if !request.is_requested(validator) {
            violations.push(InvariantViolation::UnrequestedReporter(*validator));
        }
        if !seen.insert(validator) {
            violations.push(InvariantViolation::DuplicateReporter(*validator));
        }
    }

    if request.sufficient_validator_count > request.ask_count() {
        violations.push(InvariantViolation::ThresholdAboveAskCount {
            sufficient: request.sufficient_validator_count,
            ask_count: request.ask_count(),
        });
    }

    violations
}

/// Check INVARIANT-4.
#[must_use]
pub fn check_pending_list_invariant(list: &[RequestId]) -> Vec<InvariantViolation> {
    let mut seen = HashSet::new();
    list.iter()
        .filter(|id| !seen.insert(**id))
        .map(|id| InvariantViolation::DuplicatePendingEntry(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::OracleScriptId;

    fn make_request() -> Request {
        Request::new(
            RequestId(1),
            OracleScriptId(1),
            vec![],
            vec![[1u8; 20], [2u8; 20]],
            2,
            1,
            0,
            101,
            0,
        )
    }

    #[test]
    fn test_valid_request_has_no_violations() {
        let mut req = make_request();
        req.received_validators.push([2u8; 20]);
        assert!(check_request_invariants(&req).is_empty());
    }

    #[test]
    fn test_detects_unrequested_and_duplicate_reporters() {
        let mut req = make_request();
        req.received_validators = vec![[1u8; 20], [1u8; 20], [9u8; 20]];
        let violations = check_request_invariants(&req);
        assert!(violations.contains(&InvariantViolation::DuplicateReporter([1u8; 20])));
        assert!(violations.contains(&InvariantViolation::UnrequestedReporter([9u8; 20])));
    }

    #[test]
    fn test_detects_threshold_above_ask_count() {
        let mut req = make_request();
        req.sufficient_validator_count = 3;
        assert_eq!(
            check_request_invariants(&req),
            vec![InvariantViolation::ThresholdAboveAskCount {
                sufficient: 3,
                ask_count: 2
            }]
        );
    }

    #[test]
    fn test_pending_list_duplicates() {
        assert!(check_pending_list_invariant(&[RequestId(1), RequestId(2)]).is_empty());
        assert_eq!(
            check_pending_list_invariant(&[RequestId(1), RequestId(2), RequestId(1)]),
            vec![InvariantViolation::DuplicatePendingEntry(RequestId(1))]
        );
    }
}
