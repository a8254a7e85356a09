//! # Validator Sampler
//!
//! Deterministic weighted sampling without replacement.
//!
//! ## Algorithm
//!
//! 1. Keep active validators, one entry per address (highest power wins),
//!    and order them by `(power desc, address asc)`.
//!    Map iteration order never leaks into the result.
//! 2. For draw `i`, derive `r = u128(keccak256(seed || i)[..16]) mod total`
//!    where `total` is the power still in the pool, and take the validator
//!    whose cumulative power interval contains `r`.
//! 3. Remove the winner and repeat until `count` validators are drawn.
//! 4. Return the winners ordered by `(power desc, address asc)`.
//!
//! The output is a pure function of `(validators, seed, count)`.

use super::errors::{OracleError, OracleResult};
use super::value_objects::Address;
use sha3::{Digest, Keccak256};
use shared_types::Validator;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Weight-descending, then address-ascending.
fn by_weight_then_address(a: &Validator, b: &Validator) -> Ordering {
    b.power
        .cmp(&a.power)
        .then_with(|| a.address.cmp(&b.address))
}

/// Pseudorandom draw `i` from `seed`.
fn draw(seed: &[u8], nonce: u64) -> u128 {
    let mut hasher = Keccak256::new();
    hasher.update(seed);
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();
    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(head)
}

/// Distinct active validators in sampling order.
///
/// An address listed more than once keeps its highest power.
fn active_pool(validators: &[Validator]) -> Vec<Validator> {
    let mut by_address: BTreeMap<Address, &Validator> = BTreeMap::new();
    for v in validators.iter().filter(|v| v.active) {
        by_address
            .entry(v.address)
            .and_modify(|kept| {
                if v.power > kept.power {
                    *kept = v;
                }
            })
            .or_insert(v);
    }
    let mut pool: Vec<Validator> = by_address.into_values().cloned().collect();
    pool.sort_by(by_weight_then_address);
    pool
}

/// Number of distinct active validators available for sampling.
pub fn active_count(validators: &[Validator]) -> u64 {
    active_pool(validators).len() as u64
}

/// Sample `count` distinct active validators, weighted by power.
///
/// # Errors
///
/// `InsufficientValidators` if fewer than `count` validators are active.
pub fn sample(validators: &[Validator], seed: &[u8], count: u64) -> OracleResult<Vec<Address>> {
    let mut pool = active_pool(validators);

    let available = pool.len() as u64;
    if count > available {
        return Err(OracleError::InsufficientValidators {
            requested: count,
            available,
        });
    }

    let mut chosen = Vec::with_capacity(count as usize);
    let mut total: u128 = pool.iter().map(|v| u128::from(v.power)).sum();

    for nonce in 0..count {
        let index = if total == 0 {
            // Only zero-power validators remain.
            0
        } else {
            let target = draw(seed, nonce) % total;
            let mut cumulative: u128 = 0;
            pool.iter()
                .position(|v| {
                    cumulative += u128::from(v.power);
                    target < cumulative
                })
                .unwrap_or(pool.len() - 1)
        };
        let winner = pool.remove(index);
        total -= u128::from(winner.power);
        chosen.push(winner);
    }

    chosen.sort_by(by_weight_then_address);
    Ok(chosen.into_iter().map(|v| v.address).collect())
}
