use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use tracing::{debug, trace, warn};

use crate::error::{CoreError, RpcError};

use super::super::NodeRpc;
use super::connection::{parse_connection, resolve_auth};
use super::protocol::{decode_envelope, parse_jsonrpc_error, JsonRpcRequest};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Node JSON-RPC 1.0 client over HTTP(S).
///
/// One request per call; no batching, no retries. Request ids start at 1 and
/// increase by one per call for the lifetime of the client, including calls
/// that later fail.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    auth: (String, String),
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a new client for an HTTP(S) URL.
    ///
    /// Authentication precedence:
    /// 1. explicit `user` + `pass`
    /// 2. cookie file (`username:password`) from `cookie_file`
    /// 3. empty credentials
    ///
    /// If `requests_per_second` is set, every outbound request waits for the
    /// rate limiter first.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        cookie_file: Option<&Path>,
        requests_per_second: Option<u32>,
    ) -> Result<Self, CoreError> {
        let auth = resolve_auth(user, pass, cookie_file)?;
        let url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::Config(format!("build HTTP client: {e}")))?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            auth,
            limiter,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn reserve_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn round_trip(
        &self,
        id: u64,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, RpcError> {
        let req = JsonRpcRequest {
            jsonrpc: "1.0",
            id,
            method,
            params,
        };

        let (user, pass) = &self.auth;
        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(user, Some(pass))
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_owned(),
            });
        }

        let body = response.text().await?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        let decoded = decode_envelope(&body)?;
        if let Some(err) = decoded.error {
            return Err(parse_jsonrpc_error(err));
        }

        Ok(decoded.result.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl NodeRpc for HttpRpcClient {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        self.wait_for_rate_limit().await;
        let id = self.reserve_request_id();
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );

        self.round_trip(id, method, params).await.map_err(|err| {
            warn!(rpc.id = id, rpc.method = method, error = %err, "rpc call failed");
            CoreError::Rpc(err)
        })
    }
}
