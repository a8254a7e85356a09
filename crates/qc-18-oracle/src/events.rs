//! Published events
//!
//! Emitted by the keeper only after the producing operation's writes have
//! been committed. Failed operations emit nothing.

use crate::domain::{
    Address, DataSourceId, ExternalId, OracleScriptId, RequestId, ResolveStatus,
};
use serde::{Deserialize, Serialize};

/// Lifecycle event, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// A request was admitted and its validators sampled.
    RequestAdded {
        request_id: RequestId,
        oracle_script_id: OracleScriptId,
        requested_validators: Vec<Address>,
        sufficient_validator_count: u64,
        expiration_height: u64,
        execute_gas: u64,
    },

    /// A raw data request was attached to an open request.
    RawRequestAdded {
        request_id: RequestId,
        external_id: ExternalId,
        data_source_id: DataSourceId,
    },

    /// A requested validator's reports were recorded.
    ReportReceived {
        request_id: RequestId,
        validator: Address,
        report_count: u64,
    },

    /// The request reached its threshold and joined the pending resolve list.
    RequestPending { request_id: RequestId },

    /// The oracle script ran for a pending request.
    RequestResolved {
        request_id: RequestId,
        status: ResolveStatus,
        gas_used: u64,
    },

    /// The request hit its expiration height unresolved.
    RequestExpired {
        request_id: RequestId,
        report_count: u64,
    },
}

impl OracleEvent {
    /// Request the event concerns.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::RequestAdded { request_id, .. }
            | Self::RawRequestAdded { request_id, .. }
            | Self::ReportReceived { request_id, .. }
            | Self::RequestPending { request_id }
            | Self::RequestResolved { request_id, .. }
            | Self::RequestExpired { request_id, .. } => *request_id,
        }
    }
}
