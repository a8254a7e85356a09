//! Storage key layout.
//!
//! All integers are big-endian so ascending key order equals ascending
//! numeric order within a prefix.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `0x01` | - | request count (`u64`) |
//! | `0x02` | request id | `Request` |
//! | `0x03` | request id, external id | `RawDataRequest` |
//! | `0x04` | request id, validator, external id | `RawDataReport` |
//! | `0x05` | - | pending resolve list |
//! | `0x06` | - | rolling seed |
//! | `0x07` | request id | `RequestResult` |
//! | `0x08` | oracle script id | `OracleScript` |
//! | `0x09` | data source id | `DataSource` |
//! | `0x0A` | - | `Params` |
//! | `0x0B` | expiration height, request id | empty |

use crate::domain::{Address, DataSourceId, ExternalId, OracleScriptId, RequestId};

pub const REQUEST_COUNT: &[u8] = &[0x01];
pub const REQUEST_PREFIX: u8 = 0x02;
pub const RAW_DATA_REQUEST_PREFIX: u8 = 0x03;
pub const REPORT_PREFIX: u8 = 0x04;
pub const PENDING_RESOLVE_LIST: &[u8] = &[0x05];
pub const ROLLING_SEED: &[u8] = &[0x06];
pub const RESULT_PREFIX: u8 = 0x07;
pub const ORACLE_SCRIPT_PREFIX: u8 = 0x08;
pub const DATA_SOURCE_PREFIX: u8 = 0x09;
pub const PARAMS: &[u8] = &[0x0A];
pub const EXPIRY_INDEX_PREFIX: u8 = 0x0B;

fn with_prefix(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = 1 + parts.iter().map(|p| p.len()).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

pub fn request(id: RequestId) -> Vec<u8> {
    with_prefix(REQUEST_PREFIX, &[&id.to_be_bytes()])
}

pub fn raw_data_requests(id: RequestId) -> Vec<u8> {
    with_prefix(RAW_DATA_REQUEST_PREFIX, &[&id.to_be_bytes()])
}

pub fn raw_data_request(id: RequestId, external_id: ExternalId) -> Vec<u8> {
    with_prefix(
        RAW_DATA_REQUEST_PREFIX,
        &[&id.to_be_bytes(), &external_id.to_be_bytes()],
    )
}

/// Trailing external id of a raw data request key.
pub fn external_id_suffix(key: &[u8]) -> Option<ExternalId> {
    let tail: [u8; 8] = key.get(key.len().checked_sub(8)?..)?.try_into().ok()?;
    Some(ExternalId(u64::from_be_bytes(tail)))
}

pub fn reports_of(id: RequestId, validator: &Address) -> Vec<u8> {
    with_prefix(REPORT_PREFIX, &[&id.to_be_bytes(), validator])
}

pub fn report(id: RequestId, validator: &Address, external_id: ExternalId) -> Vec<u8> {
    with_prefix(
        REPORT_PREFIX,
        &[&id.to_be_bytes(), validator, &external_id.to_be_bytes()],
    )
}

pub fn result(id: RequestId) -> Vec<u8> {
    with_prefix(RESULT_PREFIX, &[&id.to_be_bytes()])
}

pub fn oracle_script(id: OracleScriptId) -> Vec<u8> {
    with_prefix(ORACLE_SCRIPT_PREFIX, &[&id.to_be_bytes()])
}

pub fn data_source(id: DataSourceId) -> Vec<u8> {
    with_prefix(DATA_SOURCE_PREFIX, &[&id.to_be_bytes()])
}

pub fn expiry_index() -> Vec<u8> {
    vec![EXPIRY_INDEX_PREFIX]
}

pub fn expiry_entry(expiration_height: u64, id: RequestId) -> Vec<u8> {
    with_prefix(
        EXPIRY_INDEX_PREFIX,
        &[&expiration_height.to_be_bytes(), &id.to_be_bytes()],
    )
}

/// Decode `(expiration_height, request_id)` from an expiry index key.
pub fn parse_expiry_entry(key: &[u8]) -> Option<(u64, RequestId)> {
    if key.len() != 17 || key[0] != EXPIRY_INDEX_PREFIX {
        return None;
    }
    let height: [u8; 8] = key[1..9].try_into().ok()?;
    let id: [u8; 8] = key[9..17].try_into().ok()?;
    Some((u64::from_be_bytes(height), RequestId(u64::from_be_bytes(id))))
}
