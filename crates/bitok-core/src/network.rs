//! Shared snapshot of the node's `getinfo`.
//!
//! A background task refreshes the snapshot on a fixed interval while page
//! resolution reads it concurrently. Writes are last-write-wins; readers may
//! see a tip that is one refresh behind the node.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::rpc::{NodeInfo, NodeRpc};
use crate::types::BlockHeight;

/// Default refresh interval for [`NetworkStatus::spawn_refresh`].
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Target spacing between blocks, in seconds.
const TARGET_BLOCK_SPACING_SECS: f64 = 600.0;

/// Estimated network hashrate in hashes per second for `difficulty`.
///
/// A difficulty-1 block takes 2^32 hashes on average.
pub fn estimate_hashrate(difficulty: f64) -> f64 {
    difficulty * 2f64.powi(32) / TARGET_BLOCK_SPACING_SECS
}

pub struct NetworkStatus {
    rpc: Arc<dyn NodeRpc>,
    snapshot: RwLock<Option<NodeInfo>>,
}

impl NetworkStatus {
    pub fn new(rpc: Arc<dyn NodeRpc>) -> Self {
        Self {
            rpc,
            snapshot: RwLock::new(None),
        }
    }

    /// Fetch `getinfo` and replace the snapshot.
    pub async fn refresh(&self) -> Result<NodeInfo, CoreError> {
        let info = self.rpc.get_info().await?;
        debug!(
            blocks = info.blocks,
            connections = info.connections,
            difficulty = info.difficulty,
            "network status refreshed"
        );
        *self.snapshot.write().await = Some(info.clone());
        Ok(info)
    }

    /// The last snapshot, if any refresh has succeeded.
    pub async fn snapshot(&self) -> Option<NodeInfo> {
        self.snapshot.read().await.clone()
    }

    /// The cached snapshot, fetching once if there is none yet.
    pub async fn info(&self) -> Result<NodeInfo, CoreError> {
        match self.snapshot().await {
            Some(info) => Ok(info),
            None => self.refresh().await,
        }
    }

    /// Current chain tip as of the last snapshot.
    pub async fn tip(&self) -> Result<BlockHeight, CoreError> {
        Ok(BlockHeight(self.info().await?.blocks))
    }

    /// Refresh on a fixed interval until the returned task is aborted.
    ///
    /// The first refresh happens immediately. A failed refresh is logged and
    /// leaves the previous snapshot in place.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = self.refresh().await {
                    warn!(error = %err, "network status refresh failed");
                }
            }
        })
    }
}
