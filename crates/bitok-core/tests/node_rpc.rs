use std::env;
use std::num::NonZeroUsize;
use std::sync::{Arc, Once};

use bitok_core::resolver::{CachedHeightIndex, LinearScan, Resolver, SearchHit};
use bitok_core::rpc::{HttpRpcClient, NodeRpc};
use bitok_core::{BlockHeight, CoreError, NetworkStatus, NotFound};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bitok_core=debug")),
            )
            .with_target(true)
            .try_init();
    });
}

fn live_client() -> Arc<dyn NodeRpc> {
    let rpc_url = env::var("BITOK_TEST_RPC_URL").expect("BITOK_TEST_RPC_URL must be set");
    let rpc_user = env::var("BITOK_TEST_RPC_USER").ok();
    let rpc_pass = env::var("BITOK_TEST_RPC_PASS").ok();
    let client = HttpRpcClient::new(
        &rpc_url,
        rpc_user.as_deref(),
        rpc_pass.as_deref(),
        None,
        Some(50),
    )
    .expect("rpc client must construct");
    Arc::new(client)
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Bitok node; set BITOK_TEST_RPC_URL"]
async fn live_node_answers_chain_queries() {
    init_tracing();
    let rpc = live_client();

    let info = rpc.get_info().await.expect("getinfo must succeed");
    let count = rpc.get_block_count().await.expect("getblockcount must succeed");
    assert!(
        count.0 >= info.blocks,
        "block count must not go backwards between calls"
    );

    let genesis_hash = rpc
        .get_block_hash(BlockHeight(0))
        .await
        .expect("genesis hash must resolve");
    let genesis = rpc.get_block(&genesis_hash).await.expect("genesis must decode");
    assert!(genesis.previous_block_hash.is_none());
    assert_eq!(genesis.tx.len(), 1, "genesis holds only its coinbase");

    let err = rpc
        .get_block_hash(BlockHeight(count.0 + 1000))
        .await
        .expect_err("height beyond the tip must fail");
    let CoreError::Rpc(rpc_err) = err else {
        panic!("expected an rpc error, got {err:?}");
    };
    assert!(rpc_err.is_lookup_miss());
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Bitok node; set BITOK_TEST_RPC_URL"]
async fn live_resolver_round_trips_heights() {
    init_tracing();
    let rpc = live_client();
    let status = Arc::new(NetworkStatus::new(rpc.clone()));
    let heights = Arc::new(CachedHeightIndex::new(
        LinearScan::new(rpc.clone()),
        NonZeroUsize::new(64).expect("non-zero"),
    ));
    let resolver = Resolver::new(rpc.clone(), status.clone(), heights);

    let tip = status.tip().await.expect("tip must resolve");
    let target = BlockHeight(tip.0.saturating_sub(3));
    let by_height = resolver.block_at(target).await.expect("block must resolve");

    let hit = resolver
        .search(&by_height.hash.to_string())
        .await
        .expect("search by hash must resolve");
    let SearchHit::Block(by_hash) = hit else {
        panic!("a block hash must resolve to a block");
    };
    assert_eq!(by_hash.height, target);

    let page = resolver.paginate(1, 5).await.expect("first page must resolve");
    assert!(page.blocks.len() <= 5);
    assert!(page.blocks.windows(2).all(|w| w[0].height > w[1].height));

    let missing = resolver
        .resolve_transaction(&"00".repeat(32))
        .await
        .expect_err("a zero txid is never in the wallet");
    assert!(matches!(
        missing,
        CoreError::NotFound(NotFound::OutsideWallet(_))
    ));
}
