//! # Block Hooks
//!
//! Per-block entry points called by the consensus engine.
//!
//! ```text
//! begin_block(header)  seed <- update(seed, header.hash)
//! ...transactions...
//! end_block(ctx)       resolve(pending[0..n]) ; pending <- [] ; sweep_expired(height)
//! ```
//!
//! Resolution runs before the expiry sweep, so a request that reaches its
//! threshold in the block where it also expires resolves normally.

use crate::domain::Context;
use crate::domain::OracleResult;
use crate::events::OracleEvent;
use crate::metrics;
use crate::ports::{
    BlockHooks, EndBlockSummary, KeyValueStore, OracleScriptExecutor, ValidatorSetProvider,
};
use crate::service::{lifecycle, OracleKeeper};
use crate::store::{CacheStore, RequestStore};
use shared_types::BlockHeader;
use tracing::{debug, info, instrument};

impl<S, V, E> BlockHooks for OracleKeeper<S, V, E>
where
    S: KeyValueStore,
    V: ValidatorSetProvider,
    E: OracleScriptExecutor,
{
    #[instrument(skip(self, header), fields(height = header.height))]
    fn begin_block(&mut self, header: &BlockHeader) -> OracleResult<()> {
        let mut seed = self.store.get_rolling_seed()?;
        seed.update(&header.hash);
        self.store.set_rolling_seed(&seed)?;
        debug!("rolling seed updated");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(height = ctx.block_height))]
    fn end_block(&mut self, ctx: &Context) -> OracleResult<EndBlockSummary> {
        let mut cache = CacheStore::new(&self.store);
        let mut summary = EndBlockSummary::default();
        let mut events = Vec::new();

        let pending = cache.get_pending_resolve_list()?;
        for request_id in pending {
            let Some(result) =
                lifecycle::resolve(&mut cache, self.executor.as_ref(), ctx, request_id)?
            else {
                continue;
            };
            summary.resolved.push(request_id);
            events.push(OracleEvent::RequestResolved {
                request_id,
                status: result.status,
                gas_used: result.gas_used,
            });
        }
        cache.set_pending_resolve_list(&[])?;

        for result in lifecycle::sweep_expired(&mut cache, ctx)? {
            summary.expired.push(result.request_id);
            events.push(OracleEvent::RequestExpired {
                request_id: result.request_id,
                report_count: result.report_count,
            });
        }

        let batch = cache.into_batch();
        self.commit(batch)?;

        if !summary.resolved.is_empty() || !summary.expired.is_empty() {
            info!(
                resolved = summary.resolved.len(),
                expired = summary.expired.len(),
                "end block processed"
            );
        }
        for event in &events {
            match event {
                OracleEvent::RequestResolved { status, .. } => {
                    metrics::record_request_resolved(status.as_str())
                }
                OracleEvent::RequestExpired { .. } => metrics::record_request_expired(),
                _ => {}
            }
        }
        self.emit(events);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryKVStore, StaticValidatorSet};
    use crate::config::GenesisState;
    use crate::domain::{
        ExecutionFailure, OracleScript, OracleScriptId, ResolveStatus, RollingSeed,
    };
    use crate::ports::{ExecutionInput, ExecutionOutput, OracleApi, RequestMsg};
    use crate::service::OracleDependencies;
    use shared_types::Validator;
    use std::sync::Arc;

    struct EchoExecutor;

    impl OracleScriptExecutor for EchoExecutor {
        fn execute(
            &self,
            _script: &OracleScript,
            input: &ExecutionInput,
        ) -> Result<ExecutionOutput, ExecutionFailure> {
            Ok(ExecutionOutput {
                result: input.calldata.clone(),
                gas_used: 1,
            })
        }
    }

    fn keeper() -> OracleKeeper<InMemoryKVStore, StaticValidatorSet, EchoExecutor> {
        let mut keeper = OracleKeeper::new(OracleDependencies {
            store: InMemoryKVStore::new(),
            validators: Arc::new(StaticValidatorSet::new(vec![Validator::new([1; 20], 10)])),
            executor: Arc::new(EchoExecutor),
            authority: [9; 20],
        });
        let genesis = GenesisState {
            oracle_scripts: vec![(
                OracleScriptId(1),
                OracleScript {
                    owner: [9; 20],
                    name: "echo".into(),
                    code: vec![],
                },
            )],
            ..GenesisState::default()
        };
        keeper.init_genesis(&genesis).unwrap();
        keeper
    }

    fn header(height: u64, first_byte: u8) -> BlockHeader {
        let mut header = BlockHeader::new(height, 1_000 + height, [0; 32], [0; 20]);
        header.hash[0] = first_byte;
        header
    }

    #[test]
    fn test_begin_block_shifts_seed() {
        let mut keeper = keeper();
        keeper.begin_block(&header(1, 0xAA)).unwrap();
        keeper.begin_block(&header(2, 0xBB)).unwrap();

        let mut expected = [0u8; 32];
        expected[30] = 0xAA;
        expected[31] = 0xBB;
        assert_eq!(
            keeper.get_rolling_seed().unwrap(),
            RollingSeed::from_bytes(expected)
        );
    }

    #[test]
    fn test_end_block_on_empty_state_is_noop() {
        let mut keeper = keeper();
        let summary = keeper.end_block(&Context::new(1, 1_001, 0)).unwrap();
        assert_eq!(summary, EndBlockSummary::default());
        assert!(keeper.drain_events().is_empty());
    }

    #[test]
    fn test_threshold_in_expiry_block_resolves_rather_than_expires() {
        let mut keeper = keeper();
        let mut ctx = Context::new(10, 1_010, 1_000_000);
        let id = keeper
            .add_request(
                &mut ctx,
                RequestMsg::new(OracleScriptId(1), b"x".to_vec(), 1, 1, 5, 100),
            )
            .unwrap();

        let mut report_ctx = Context::new(15, 1_015, 1_000_000);
        keeper
            .report_data(&mut report_ctx, id, [1; 20], vec![])
            .unwrap();

        let summary = keeper.end_block(&Context::new(15, 1_015, 0)).unwrap();
        assert_eq!(summary.resolved, vec![id]);
        assert!(summary.expired.is_empty());

        let result = keeper.get_result(id).unwrap().unwrap();
        assert_eq!(result.status, ResolveStatus::Success);
        assert_eq!(result.result, b"x".to_vec());
        assert!(keeper.get_pending_resolve_list().unwrap().is_empty());
    }
}
