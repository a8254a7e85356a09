//! Oracle lifecycle integration tests
//!
//! Drive the keeper through block hooks and transactions the way the host
//! node does, using only the public API.

use qc_18_oracle::{
    BlockHooks, Context, DataSourceId, ExecutionFailure, ExecutionInput, ExecutionOutput,
    ExternalId, InMemoryKVStore, OracleApi, OracleConfig, OracleEvent, OracleKeeper,
    OracleScript, OracleScriptExecutor, OracleScriptId, RawDataReport, RequestId, RequestMsg,
    ResolveStatus, StaticValidatorSet,
};
use shared_types::{BlockHeader, Validator};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Concatenates every report's data, in arrival order.
struct ConcatExecutor;

impl OracleScriptExecutor for ConcatExecutor {
    fn execute(
        &self,
        _script: &OracleScript,
        input: &ExecutionInput,
    ) -> Result<ExecutionOutput, ExecutionFailure> {
        let result = input
            .reports
            .iter()
            .flat_map(|v| v.reports.iter().flat_map(|r| r.data.clone()))
            .collect();
        Ok(ExecutionOutput {
            result,
            gas_used: 100 * input.reports.len() as u64,
        })
    }
}

const CONFIG: &str = r#"
    authority = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"

    [params]
    max_calldata_size = 64
    max_data_source_count_per_request = 2
    expiration_block_count = 20

    [[oracle_scripts]]
    id = 1
    owner = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    name = "concat"
    code = "0061736d"

    [[data_sources]]
    id = 1
    owner = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    name = "price feed"
    executable = "2321"
"#;

type Keeper = OracleKeeper<InMemoryKVStore, StaticValidatorSet, ConcatExecutor>;

fn validator(id: u8, power: u64) -> Validator {
    Validator::new([id; 20], power)
}

fn setup(validators: Vec<Validator>) -> Keeper {
    init_tracing();
    let config = OracleConfig::parse(CONFIG).unwrap();
    OracleKeeper::with_genesis(
        InMemoryKVStore::new(),
        Arc::new(StaticValidatorSet::new(validators)),
        Arc::new(ConcatExecutor),
        &config,
    )
    .unwrap()
}

fn block(keeper: &mut Keeper, height: u64) -> BlockHeader {
    let header = BlockHeader::new(height, 1_600_000_000 + height, [height as u8; 32], [0; 20]);
    keeper.begin_block(&header).unwrap();
    header
}

fn tx_ctx(header: &BlockHeader) -> Context {
    Context::new(header.height, header.timestamp, 5_000_000)
}

#[test]
fn test_weighted_two_validator_request_resolves_next_end_block() {
    let mut keeper = setup(vec![validator(1, 10), validator(2, 100)]);

    let header = block(&mut keeper, 1);
    let mut ctx = tx_ctx(&header);
    let id = keeper
        .add_request(
            &mut ctx,
            RequestMsg::new(OracleScriptId(1), b"BTC".to_vec(), 2, 2, 0, 50_000),
        )
        .unwrap();
    keeper
        .add_raw_data_request(&mut ctx, id, ExternalId(1), DataSourceId(1), b"BTC".to_vec())
        .unwrap();

    let request = keeper.get_request(id).unwrap();
    assert_eq!(request.requested_validators, vec![[2; 20], [1; 20]]);
    assert_eq!(request.expiration_height, 21);
    keeper.end_block(&Context::for_block(&header)).unwrap();

    let header = block(&mut keeper, 2);
    let mut ctx = tx_ctx(&header);
    for (who, answer) in [(1u8, b"a"), (2u8, b"b")] {
        keeper
            .report_data(
                &mut ctx,
                id,
                [who; 20],
                vec![RawDataReport::new(ExternalId(1), 0, answer.to_vec())],
            )
            .unwrap();
    }
    assert_eq!(keeper.get_pending_resolve_list().unwrap(), vec![id]);

    let summary = keeper.end_block(&Context::for_block(&header)).unwrap();
    assert_eq!(summary.resolved, vec![id]);

    let result = keeper.get_result(id).unwrap().unwrap();
    assert_eq!(result.status, ResolveStatus::Success);
    assert_eq!(result.result, b"ab".to_vec());
    assert_eq!(result.gas_used, 200);
    assert_eq!(result.resolve_height, 2);

    let kinds: Vec<_> = keeper
        .drain_events()
        .into_iter()
        .map(|e| match e {
            OracleEvent::RequestAdded { .. } => "added",
            OracleEvent::RawRequestAdded { .. } => "raw",
            OracleEvent::ReportReceived { .. } => "report",
            OracleEvent::RequestPending { .. } => "pending",
            OracleEvent::RequestResolved { .. } => "resolved",
            OracleEvent::RequestExpired { .. } => "expired",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["added", "raw", "report", "report", "pending", "resolved"]
    );
}

#[test]
fn test_failed_admissions_do_not_consume_ids() {
    let mut keeper = setup(vec![validator(1, 10), validator(2, 100)]);
    let header = block(&mut keeper, 1);
    let mut ctx = tx_ctx(&header);

    let too_big = RequestMsg::new(OracleScriptId(1), vec![0; 65], 1, 1, 0, 1_000);
    assert!(keeper.add_request(&mut ctx, too_big).is_err());
    let too_many = RequestMsg::new(OracleScriptId(1), vec![], 3, 1, 0, 1_000);
    assert!(keeper.add_request(&mut ctx, too_many).is_err());
    assert_eq!(keeper.request_count().unwrap(), 0);

    let id = keeper
        .add_request(&mut ctx, RequestMsg::new(OracleScriptId(1), vec![], 1, 1, 0, 1_000))
        .unwrap();
    assert_eq!(id, RequestId(1));
}

#[test]
fn test_replicas_reach_identical_state() {
    let run = |validators: Vec<Validator>| {
        let mut keeper = setup(validators);
        let mut ids = Vec::new();
        for height in 1..=5 {
            let header = block(&mut keeper, height);
            let mut ctx = tx_ctx(&header);
            ids.push(
                keeper
                    .add_request(
                        &mut ctx,
                        RequestMsg::new(OracleScriptId(1), vec![], 2, 1, 0, 1_000),
                    )
                    .unwrap(),
            );
            keeper.end_block(&Context::for_block(&header)).unwrap();
        }
        let samples: Vec<_> = ids
            .iter()
            .map(|id| keeper.get_request(*id).unwrap().requested_validators)
            .collect();
        (keeper.get_rolling_seed().unwrap(), samples)
    };

    let set = vec![validator(1, 5), validator(2, 50), validator(3, 500), validator(4, 5_000)];
    let mut shuffled = set.clone();
    shuffled.reverse();
    assert_eq!(run(set), run(shuffled));
}

#[test]
fn test_unanswered_request_expires_after_configured_blocks() {
    let mut keeper = setup(vec![validator(1, 10)]);
    let header = block(&mut keeper, 1);
    let mut ctx = tx_ctx(&header);
    let id = keeper
        .add_request(&mut ctx, RequestMsg::new(OracleScriptId(1), vec![], 1, 1, 0, 1_000))
        .unwrap();

    for height in 2..21 {
        let header = block(&mut keeper, height);
        let summary = keeper.end_block(&Context::for_block(&header)).unwrap();
        assert!(summary.expired.is_empty(), "expired early at {height}");
    }

    let header = block(&mut keeper, 21);
    let summary = keeper.end_block(&Context::for_block(&header)).unwrap();
    assert_eq!(summary.expired, vec![id]);
    assert_eq!(
        keeper.get_result(id).unwrap().unwrap().status,
        ResolveStatus::Expired
    );
}
