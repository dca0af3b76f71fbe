use std::env;
use std::time::Duration;

use reqwest::header::ORIGIN;
use reqwest::{Client, StatusCode};
use serde_json::Value;

async fn wait_for_server(client: &Client, base_url: &str) {
    let health_url = format!("{base_url}/api/v1/health");
    for _ in 0..60 {
        if let Ok(resp) = client.get(&health_url).send().await {
            if resp.status() == StatusCode::OK {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("server did not become healthy in time");
}

async fn get(client: &Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(&url).send().await.expect("request must send");
    let status = resp.status();
    let body = resp.json().await.expect("response must be JSON");
    (status, body)
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running node and `bitok-explorer serve`; set BITOK_TEST_SERVER_BASE_URL"]
async fn live_server_covers_api_surface() {
    let base_url =
        env::var("BITOK_TEST_SERVER_BASE_URL").expect("BITOK_TEST_SERVER_BASE_URL must be set");
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client must build");

    wait_for_server(&client, &base_url).await;

    // =========================================================================
    // Network
    // =========================================================================

    let (status, network) = get(&client, format!("{base_url}/api/v1/network")).await;
    assert_eq!(status, StatusCode::OK);
    let tip = network["info"]["blocks"].as_u64().expect("tip height");
    assert!(network["hashrate"].as_f64().is_some());

    let (status, dashboard) = get(&client, format!("{base_url}/api/v1/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    let recent = dashboard["recent_blocks"].as_array().expect("recent blocks");
    assert_eq!(recent.len() as u64, (tip + 1).min(10));

    // =========================================================================
    // Blocks
    // =========================================================================

    let (status, page) = get(&client, format!("{base_url}/api/v1/blocks?page=1&page_size=5")).await;
    assert_eq!(status, StatusCode::OK);
    let blocks = page["blocks"].as_array().expect("blocks");
    assert_eq!(blocks.first().and_then(|b| b["height"].as_u64()), Some(tip));

    let (status, genesis) = get(&client, format!("{base_url}/api/v1/block/0")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(genesis.get("previous_block_hash").map_or(true, Value::is_null));

    let genesis_hash = genesis["hash"].as_str().expect("genesis hash");
    let (status, by_hash) = get(&client, format!("{base_url}/api/v1/block/{genesis_hash}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_hash["height"], 0);

    let (status, _) = get(&client, format!("{base_url}/api/v1/block/{}", tip + 1000)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // =========================================================================
    // Search and lookups
    // =========================================================================

    let (status, hit) = get(&client, format!("{base_url}/api/v1/search?q={tip}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hit["kind"], "block");

    let (status, _) = get(&client, format!("{base_url}/api/v1/search?q=zz")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, mempool) = get(&client, format!("{base_url}/api/v1/mempool")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(mempool.is_array());

    let (status, _) = get(&client, format!("{base_url}/api/v1/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // =========================================================================
    // CORS
    // =========================================================================

    let resp = client
        .get(format!("{base_url}/api/v1/health"))
        .header(ORIGIN, "http://evil.example")
        .send()
        .await
        .expect("request must send");
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
