//! # Driving Ports (Inbound API)
//!
//! State-transition entry points exposed to the transaction layer and the
//! two block hooks invoked by the consensus engine.

use crate::domain::{
    Address, Context, DataSourceId, ExternalId, OracleResult, OracleScriptId, Params,
    RawDataReport, RequestId,
};
use shared_types::BlockHeader;

/// A client's data request, as carried by a request transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestMsg {
    pub oracle_script_id: OracleScriptId,
    pub calldata: Vec<u8>,
    pub ask_count: u64,
    pub min_count: u64,
    /// Zero selects `Params::expiration_block_count`.
    pub expiration_block_count: u64,
    pub execute_gas: u64,
}

impl RequestMsg {
    pub fn new(
        oracle_script_id: OracleScriptId,
        calldata: Vec<u8>,
        ask_count: u64,
        min_count: u64,
        expiration_block_count: u64,
        execute_gas: u64,
    ) -> Self {
        Self {
            oracle_script_id,
            calldata,
            ask_count,
            min_count,
            expiration_block_count,
            execute_gas,
        }
    }
}

/// Transaction entry points.
///
/// Every method is all-or-nothing: on `Err` no state is written and no event
/// is emitted.
pub trait OracleApi {
    /// Admit a request, sample its validators and pre-charge its execute gas.
    fn add_request(&mut self, ctx: &mut Context, msg: RequestMsg) -> OracleResult<RequestId>;

    /// Attach a raw data request for one data source.
    fn add_raw_data_request(
        &mut self,
        ctx: &mut Context,
        request_id: RequestId,
        external_id: ExternalId,
        data_source_id: DataSourceId,
        calldata: Vec<u8>,
    ) -> OracleResult<()>;

    /// Record one validator's reports; queues the request for resolution
    /// when this report meets the threshold.
    fn report_data(
        &mut self,
        ctx: &mut Context,
        request_id: RequestId,
        validator: Address,
        reports: Vec<RawDataReport>,
    ) -> OracleResult<()>;

    /// Privileged params update.
    fn update_params(&mut self, authority: &Address, params: Params) -> OracleResult<()>;
}

/// What one end-of-block pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndBlockSummary {
    /// Requests resolved from the pending list, in list order.
    pub resolved: Vec<RequestId>,
    /// Requests terminated by the expiry sweep, in sweep order.
    pub expired: Vec<RequestId>,
}

/// Hooks invoked by the consensus engine once per block.
pub trait BlockHooks {
    /// Advance the rolling seed with the new block's hash.
    fn begin_block(&mut self, header: &BlockHeader) -> OracleResult<()>;

    /// Resolve the pending list, clear it, then sweep expired requests.
    fn end_block(&mut self, ctx: &Context) -> OracleResult<EndBlockSummary>;
}
