//! # Request Store
//!
//! Typed access to oracle state on top of any [`KeyValueStore`]. Values are
//! bincode-encoded; keys follow the layout in [`keys`].
//!
//! `RequestStore` is blanket-implemented, so the committed store and a
//! [`CacheStore`] overlay expose the same accessors.

pub mod cache;
pub mod keys;

pub use cache::CacheStore;

use crate::domain::{
    Address, DataSource, DataSourceId, ExternalId, OracleError, OracleResult, OracleScript,
    OracleScriptId, Params, RawDataReport, RawDataRequest, Request, RequestId, RequestResult,
    RollingSeed,
};
use crate::ports::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed accessors over the oracle key space.
pub trait RequestStore: KeyValueStore {
    // === CODEC ===

    fn get_typed<T: DeserializeOwned>(&self, key: &[u8]) -> OracleResult<Option<T>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_typed<T: Serialize>(&mut self, key: &[u8], value: &T) -> OracleResult<()> {
        let bytes = bincode::serialize(value)?;
        self.put(key, &bytes)?;
        Ok(())
    }

    // === REQUESTS ===

    /// Number of requests ever admitted; also the last assigned id.
    fn request_count(&self) -> OracleResult<u64> {
        Ok(self.get_typed(keys::REQUEST_COUNT)?.unwrap_or(0))
    }

    fn set_request_count(&mut self, count: u64) -> OracleResult<()> {
        self.put_typed(keys::REQUEST_COUNT, &count)
    }

    fn get_request(&self, id: RequestId) -> OracleResult<Request> {
        self.get_typed(&keys::request(id))?
            .ok_or(OracleError::RequestNotFound(id))
    }

    fn has_request(&self, id: RequestId) -> OracleResult<bool> {
        Ok(self.exists(&keys::request(id))?)
    }

    fn set_request(&mut self, request: &Request) -> OracleResult<()> {
        self.put_typed(&keys::request(request.id), request)
    }

    // === RAW DATA REQUESTS ===

    fn get_raw_data_request(
        &self,
        id: RequestId,
        external_id: ExternalId,
    ) -> OracleResult<Option<RawDataRequest>> {
        self.get_typed(&keys::raw_data_request(id, external_id))
    }

    fn set_raw_data_request(
        &mut self,
        id: RequestId,
        external_id: ExternalId,
        raw: &RawDataRequest,
    ) -> OracleResult<()> {
        self.put_typed(&keys::raw_data_request(id, external_id), raw)
    }

    /// Raw data requests of `id`, ordered by external id.
    fn get_raw_data_requests(&self, id: RequestId) -> OracleResult<Vec<(ExternalId, RawDataRequest)>> {
        self.prefix_scan(&keys::raw_data_requests(id))?
            .into_iter()
            .map(|(key, bytes)| {
                let external_id = keys::external_id_suffix(&key)
                    .ok_or_else(|| OracleError::Codec("malformed raw data request key".into()))?;
                Ok((external_id, bincode::deserialize(&bytes)?))
            })
            .collect()
    }

    fn raw_data_request_count(&self, id: RequestId) -> OracleResult<u64> {
        Ok(self.prefix_scan(&keys::raw_data_requests(id))?.len() as u64)
    }

    // === REPORTS ===

    fn set_report(
        &mut self,
        id: RequestId,
        validator: &Address,
        report: &RawDataReport,
    ) -> OracleResult<()> {
        self.put_typed(&keys::report(id, validator, report.external_id), report)
    }

    /// Reports of one validator for `id`, ordered by external id.
    fn get_reports(&self, id: RequestId, validator: &Address) -> OracleResult<Vec<RawDataReport>> {
        self.prefix_scan(&keys::reports_of(id, validator))?
            .into_iter()
            .map(|(_, bytes)| Ok(bincode::deserialize(&bytes)?))
            .collect()
    }

    // === PENDING RESOLVE LIST ===

    fn get_pending_resolve_list(&self) -> OracleResult<Vec<RequestId>> {
        Ok(self.get_typed(keys::PENDING_RESOLVE_LIST)?.unwrap_or_default())
    }

    fn set_pending_resolve_list(&mut self, list: &[RequestId]) -> OracleResult<()> {
        self.put_typed(keys::PENDING_RESOLVE_LIST, &list.to_vec())
    }

    // === ROLLING SEED ===

    fn get_rolling_seed(&self) -> OracleResult<RollingSeed> {
        Ok(self.get_typed(keys::ROLLING_SEED)?.unwrap_or_default())
    }

    fn set_rolling_seed(&mut self, seed: &RollingSeed) -> OracleResult<()> {
        self.put_typed(keys::ROLLING_SEED, seed)
    }

    // === RESULTS ===

    fn get_result(&self, id: RequestId) -> OracleResult<Option<RequestResult>> {
        self.get_typed(&keys::result(id))
    }

    fn set_result(&mut self, result: &RequestResult) -> OracleResult<()> {
        self.put_typed(&keys::result(result.request_id), result)
    }

    // === REGISTRY ===

    fn get_oracle_script(&self, id: OracleScriptId) -> OracleResult<OracleScript> {
        self.get_typed(&keys::oracle_script(id))?
            .ok_or(OracleError::OracleScriptNotFound(id))
    }

    fn set_oracle_script(&mut self, id: OracleScriptId, script: &OracleScript) -> OracleResult<()> {
        self.put_typed(&keys::oracle_script(id), script)
    }

    fn get_data_source(&self, id: DataSourceId) -> OracleResult<DataSource> {
        self.get_typed(&keys::data_source(id))?
            .ok_or(OracleError::DataSourceNotFound(id))
    }

    fn set_data_source(&mut self, id: DataSourceId, source: &DataSource) -> OracleResult<()> {
        self.put_typed(&keys::data_source(id), source)
    }

    // === PARAMS ===

    fn get_params(&self) -> OracleResult<Params> {
        Ok(self.get_typed(keys::PARAMS)?.unwrap_or_default())
    }

    fn set_params(&mut self, params: &Params) -> OracleResult<()> {
        self.put_typed(keys::PARAMS, params)
    }

    // === EXPIRY INDEX ===

    fn index_expiry(&mut self, expiration_height: u64, id: RequestId) -> OracleResult<()> {
        self.put(&keys::expiry_entry(expiration_height, id), &[])?;
        Ok(())
    }

    fn unindex_expiry(&mut self, expiration_height: u64, id: RequestId) -> OracleResult<()> {
        self.delete(&keys::expiry_entry(expiration_height, id))?;
        Ok(())
    }

    /// Indexed requests with `expiration_height <= height`, ordered by
    /// `(expiration_height, id)`.
    fn due_expirations(&self, height: u64) -> OracleResult<Vec<(u64, RequestId)>> {
        let mut due = Vec::new();
        for (key, _) in self.prefix_scan(&keys::expiry_index())? {
            let (expiration_height, id) = keys::parse_expiry_entry(&key)
                .ok_or_else(|| OracleError::Codec("malformed expiry index key".into()))?;
            if expiration_height > height {
                break;
            }
            due.push((expiration_height, id));
        }
        Ok(due)
    }
}

impl<T: KeyValueStore + ?Sized> RequestStore for T {}
