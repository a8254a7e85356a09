//! Oracle Service - Request lifecycle keeper
//!
//! # Architecture
//! - Every entry point stages its writes in a `CacheStore` overlay and commits
//!   them with one atomic batch. A rejected call writes nothing, charges no
//!   gas and emits no event.
//! - Validator sampling reads the rolling seed advanced in `begin_block`.
//! - Oracle scripts run only during `end_block`, against execute gas that was
//!   pre-charged at admission.

pub mod lifecycle;

use crate::config::{GenesisState, OracleConfig};
use crate::domain::gas::storage_write_cost;
use crate::domain::{
    guards, sampler, short_address, Address, Context, DataSource, DataSourceId, ExternalId,
    GasMeter, OracleError, OracleResult, OracleScript, OracleScriptId, Params, RawDataReport,
    RawDataRequest, Request, RequestId, RequestResult, RollingSeed,
};
use crate::events::OracleEvent;
use crate::metrics;
use crate::ports::{
    BatchOperation, KeyValueStore, OracleApi, OracleScriptExecutor, RequestMsg,
    ValidatorSetProvider,
};
use crate::store::{CacheStore, RequestStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Oracle keeper
///
/// Owns the committed oracle state and drives the request lifecycle.
pub struct OracleKeeper<S, V, E>
where
    S: KeyValueStore,
    V: ValidatorSetProvider,
    E: OracleScriptExecutor,
{
    pub(crate) store: S,
    pub(crate) validators: Arc<V>,
    pub(crate) executor: Arc<E>,
    authority: Address,
    events: Vec<OracleEvent>,
}

/// Dependencies for OracleKeeper
pub struct OracleDependencies<S, V, E> {
    pub store: S,
    pub validators: Arc<V>,
    pub executor: Arc<E>,
    /// Address allowed to update params.
    pub authority: Address,
}

/// Charge the storage cost of the staged puts plus `extra` to a copy of the
/// caller's meter. The copy replaces the caller's meter only after commit.
fn charge(
    meter: &GasMeter,
    (puts, bytes): (u64, u64),
    extra: u64,
    descriptor: &'static str,
) -> OracleResult<GasMeter> {
    let mut meter = meter.clone();
    meter.consume(storage_write_cost(puts, bytes), "oracle storage write")?;
    meter.consume(extra, descriptor)?;
    Ok(meter)
}

impl<S, V, E> OracleKeeper<S, V, E>
where
    S: KeyValueStore,
    V: ValidatorSetProvider,
    E: OracleScriptExecutor,
{
    /// Create a keeper over an existing store.
    pub fn new(deps: OracleDependencies<S, V, E>) -> Self {
        Self {
            store: deps.store,
            validators: deps.validators,
            executor: deps.executor,
            authority: deps.authority,
            events: Vec::new(),
        }
    }

    /// Create a keeper and write the configured genesis state.
    pub fn with_genesis(
        store: S,
        validators: Arc<V>,
        executor: Arc<E>,
        config: &OracleConfig,
    ) -> OracleResult<Self> {
        let mut keeper = Self::new(OracleDependencies {
            store,
            validators,
            executor,
            authority: config.authority,
        });
        keeper.init_genesis(&config.genesis)?;
        Ok(keeper)
    }

    /// Commit staged writes as one atomic batch.
    pub(crate) fn commit(&mut self, batch: Vec<BatchOperation>) -> OracleResult<()> {
        self.store.atomic_batch_write(batch)?;
        Ok(())
    }

    /// Record events produced by a committed operation.
    pub(crate) fn emit(&mut self, events: impl IntoIterator<Item = OracleEvent>) {
        self.events.extend(events);
    }

    /// Take all events emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<OracleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to the committed store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn authority(&self) -> &Address {
        &self.authority
    }

    // === GENESIS & REGISTRY ===

    /// Write params, a zero-filled rolling seed, an empty pending resolve
    /// list and the registry entries.
    #[instrument(skip(self, genesis))]
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> OracleResult<()> {
        genesis.params.validate().map_err(OracleError::InvalidParams)?;

        let mut cache = CacheStore::new(&self.store);
        cache.set_params(&genesis.params)?;
        cache.set_rolling_seed(&RollingSeed::init())?;
        cache.set_pending_resolve_list(&[])?;
        for (id, script) in &genesis.oracle_scripts {
            cache.set_oracle_script(*id, script)?;
        }
        for (id, source) in &genesis.data_sources {
            cache.set_data_source(*id, source)?;
        }
        let batch = cache.into_batch();
        self.commit(batch)?;

        info!(
            oracle_scripts = genesis.oracle_scripts.len(),
            data_sources = genesis.data_sources.len(),
            "oracle genesis initialized"
        );
        Ok(())
    }

    pub fn set_oracle_script(&mut self, id: OracleScriptId, script: OracleScript) -> OracleResult<()> {
        self.store.set_oracle_script(id, &script)
    }

    pub fn set_data_source(&mut self, id: DataSourceId, source: DataSource) -> OracleResult<()> {
        self.store.set_data_source(id, &source)
    }

    // === STORE-LEVEL LIFECYCLE OPERATIONS ===

    /// Overwrite a request record.
    pub fn set_request(&mut self, request: &Request) -> OracleResult<()> {
        self.store.set_request(request)
    }

    /// Append `validator` to a request's received validators.
    pub fn add_received_validator(
        &mut self,
        request_id: RequestId,
        validator: Address,
    ) -> OracleResult<()> {
        let mut cache = CacheStore::new(&self.store);
        lifecycle::add_received_validator(&mut cache, request_id, &validator)?;
        let batch = cache.into_batch();
        self.commit(batch)
    }

    /// See [`lifecycle::should_promote_to_pending`].
    pub fn should_promote_to_pending(&self, request_id: RequestId) -> OracleResult<bool> {
        lifecycle::should_promote_to_pending(&self.store, request_id)
    }

    /// Queue a request for end-of-block resolution.
    pub fn add_to_pending_list(&mut self, request_id: RequestId) -> OracleResult<()> {
        let mut cache = CacheStore::new(&self.store);
        lifecycle::add_to_pending_list(&mut cache, request_id)?;
        let batch = cache.into_batch();
        self.commit(batch)
    }

    /// Store a raw data request without checks. Pair with
    /// [`validate_data_source_count`](Self::validate_data_source_count).
    pub fn set_raw_data_request(
        &mut self,
        request_id: RequestId,
        external_id: ExternalId,
        raw: RawDataRequest,
    ) -> OracleResult<()> {
        self.store.set_raw_data_request(request_id, external_id, &raw)
    }

    /// Fail if the request carries more raw data requests than allowed.
    pub fn validate_data_source_count(&self, request_id: RequestId) -> OracleResult<()> {
        let params = self.store.get_params()?;
        lifecycle::validate_data_source_count(&self.store, request_id, &params)
    }

    /// Mark a request resolved without recording an outcome.
    pub fn set_resolved(&mut self, request_id: RequestId) -> OracleResult<()> {
        let mut cache = CacheStore::new(&self.store);
        lifecycle::set_resolved(&mut cache, request_id)?;
        let batch = cache.into_batch();
        self.commit(batch)
    }

    // === QUERIES ===

    pub fn get_request(&self, request_id: RequestId) -> OracleResult<Request> {
        self.store.get_request(request_id)
    }

    pub fn get_result(&self, request_id: RequestId) -> OracleResult<Option<RequestResult>> {
        self.store.get_result(request_id)
    }

    pub fn get_raw_data_requests(
        &self,
        request_id: RequestId,
    ) -> OracleResult<Vec<(ExternalId, RawDataRequest)>> {
        self.store.get_raw_data_requests(request_id)
    }

    pub fn get_reports(
        &self,
        request_id: RequestId,
        validator: &Address,
    ) -> OracleResult<Vec<RawDataReport>> {
        self.store.get_reports(request_id, validator)
    }

    pub fn get_pending_resolve_list(&self) -> OracleResult<Vec<RequestId>> {
        self.store.get_pending_resolve_list()
    }

    pub fn get_rolling_seed(&self) -> OracleResult<RollingSeed> {
        self.store.get_rolling_seed()
    }

    pub fn get_params(&self) -> OracleResult<Params> {
        self.store.get_params()
    }

    pub fn request_count(&self) -> OracleResult<u64> {
        self.store.request_count()
    }
}

/// Sampling input for one request: the rolling seed followed by the request id,
/// so requests admitted in the same block draw independently.
fn request_seed(seed: &RollingSeed, request_id: RequestId) -> Vec<u8> {
    let mut bytes = seed.as_bytes().to_vec();
    bytes.extend_from_slice(&request_id.to_be_bytes());
    bytes
}

impl<S, V, E> OracleApi for OracleKeeper<S, V, E>
where
    S: KeyValueStore,
    V: ValidatorSetProvider,
    E: OracleScriptExecutor,
{
    #[instrument(
        skip(self, ctx, msg),
        fields(
            oracle_script_id = %msg.oracle_script_id,
            ask_count = msg.ask_count,
            height = ctx.block_height
        )
    )]
    fn add_request(&mut self, ctx: &mut Context, msg: RequestMsg) -> OracleResult<RequestId> {
        let mut cache = CacheStore::new(&self.store);
        let params = cache.get_params()?;

        // First failure wins.
        cache.get_oracle_script(msg.oracle_script_id)?;
        guards::check_calldata_size(&msg.calldata, &params)?;
        guards::check_execute_gas(msg.execute_gas, &params)?;
        let validators = self.validators.validators();
        let available = sampler::active_count(&validators);
        if available < msg.ask_count {
            return Err(OracleError::InsufficientValidators {
                requested: msg.ask_count,
                available,
            });
        }
        guards::check_min_count(msg.ask_count, msg.min_count)?;

        let request_id = RequestId(cache.request_count()? + 1);
        let seed = cache.get_rolling_seed()?;
        let requested =
            sampler::sample(&validators, &request_seed(&seed, request_id), msg.ask_count)?;

        let expiration_block_count = match msg.expiration_block_count {
            0 => params.expiration_block_count,
            n => n,
        };
        let expiration_height = ctx.block_height.saturating_add(expiration_block_count);
        let request = Request::new(
            request_id,
            msg.oracle_script_id,
            msg.calldata,
            requested,
            msg.min_count,
            ctx.block_height,
            ctx.block_time,
            expiration_height,
            msg.execute_gas,
        );

        cache.set_request(&request)?;
        cache.set_request_count(request_id.0)?;
        cache.index_expiry(expiration_height, request_id)?;

        let meter = charge(
            &ctx.gas_meter,
            cache.staged_put_stats(),
            msg.execute_gas,
            "oracle execute gas",
        )?;
        let batch = cache.into_batch();
        self.commit(batch)?;
        ctx.gas_meter = meter;

        info!(
            request_id = %request_id,
            expiration_height,
            execute_gas = request.execute_gas,
            "oracle request added"
        );
        metrics::record_request_added();
        self.emit([OracleEvent::RequestAdded {
            request_id,
            oracle_script_id: request.oracle_script_id,
            requested_validators: request.requested_validators,
            sufficient_validator_count: request.sufficient_validator_count,
            expiration_height,
            execute_gas: request.execute_gas,
        }]);
        Ok(request_id)
    }

    #[instrument(skip(self, ctx, calldata), fields(height = ctx.block_height))]
    fn add_raw_data_request(
        &mut self,
        ctx: &mut Context,
        request_id: RequestId,
        external_id: ExternalId,
        data_source_id: DataSourceId,
        calldata: Vec<u8>,
    ) -> OracleResult<()> {
        let mut cache = CacheStore::new(&self.store);
        let params = cache.get_params()?;

        let request = cache.get_request(request_id)?;
        if request.is_resolved {
            return Err(OracleError::RequestAlreadyResolved(request_id));
        }
        if !request.received_validators.is_empty() {
            return Err(OracleError::RawRequestsSealed(request_id));
        }
        cache.get_data_source(data_source_id)?;
        guards::check_calldata_size(&calldata, &params)?;
        if cache.get_raw_data_request(request_id, external_id)?.is_some() {
            return Err(OracleError::DuplicateExternalId {
                request_id,
                external_id,
            });
        }

        cache.set_raw_data_request(
            request_id,
            external_id,
            &RawDataRequest::new(data_source_id, calldata),
        )?;
        lifecycle::validate_data_source_count(&cache, request_id, &params)?;

        let meter = charge(&ctx.gas_meter, cache.staged_put_stats(), 0, "oracle raw request")?;
        let batch = cache.into_batch();
        self.commit(batch)?;
        ctx.gas_meter = meter;

        debug!(
            request_id = %request_id,
            external_id = %external_id,
            data_source_id = %data_source_id,
            "raw data request added"
        );
        self.emit([OracleEvent::RawRequestAdded {
            request_id,
            external_id,
            data_source_id,
        }]);
        Ok(())
    }

    #[instrument(
        skip(self, ctx, reports),
        fields(validator = %short_address(&validator), height = ctx.block_height)
    )]
    fn report_data(
        &mut self,
        ctx: &mut Context,
        request_id: RequestId,
        validator: Address,
        reports: Vec<RawDataReport>,
    ) -> OracleResult<()> {
        let mut cache = CacheStore::new(&self.store);

        let request = cache.get_request(request_id)?;
        if request.is_resolved {
            return Err(OracleError::RequestAlreadyResolved(request_id));
        }

        let expected = cache.raw_data_request_count(request_id)? as usize;
        let mut seen = HashSet::with_capacity(reports.len());
        for report in &reports {
            if !seen.insert(report.external_id) {
                return Err(OracleError::DuplicateExternalId {
                    request_id,
                    external_id: report.external_id,
                });
            }
            if cache
                .get_raw_data_request(request_id, report.external_id)?
                .is_none()
            {
                return Err(OracleError::UnknownExternalId {
                    request_id,
                    external_id: report.external_id,
                });
            }
        }
        if reports.len() != expected {
            return Err(OracleError::IncompleteReports {
                request_id,
                expected,
                got: reports.len(),
            });
        }

        let request = lifecycle::add_received_validator(&mut cache, request_id, &validator)?;
        for report in &reports {
            cache.set_report(request_id, &validator, report)?;
        }

        let mut events = vec![OracleEvent::ReportReceived {
            request_id,
            validator,
            report_count: request.received_validators.len() as u64,
        }];
        if lifecycle::should_promote_to_pending(&cache, request_id)? {
            lifecycle::add_to_pending_list(&mut cache, request_id)?;
            events.push(OracleEvent::RequestPending { request_id });
        }

        let meter = charge(&ctx.gas_meter, cache.staged_put_stats(), 0, "oracle report")?;
        let batch = cache.into_batch();
        self.commit(batch)?;
        ctx.gas_meter = meter;

        if events.len() > 1 {
            info!(request_id = %request_id, "request reached report threshold");
        }
        metrics::record_report_received();
        self.emit(events);
        Ok(())
    }

    #[instrument(skip(self, authority, params), fields(authority = %short_address(authority)))]
    fn update_params(&mut self, authority: &Address, params: Params) -> OracleResult<()> {
        if authority != &self.authority {
            warn!("params update from non-authority rejected");
            return Err(OracleError::Unauthorized(*authority));
        }
        params.validate().map_err(OracleError::InvalidParams)?;
        self.store.set_params(&params)?;
        info!(?params, "oracle params updated");
        Ok(())
    }
}
