use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::BlockHash;
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::rpc::NodeRpc;
use crate::types::BlockHeight;

// ==============================================================================
// Height Index
// ==============================================================================

/// Maps a block hash to its height.
///
/// The node's block payload carries no height, so something has to derive it.
#[async_trait]
pub trait HeightIndex: Send + Sync {
    /// Height of `hash` in `floor..=tip`, or `None` if no height matches.
    async fn height_within(
        &self,
        hash: &BlockHash,
        floor: BlockHeight,
        tip: BlockHeight,
    ) -> Result<Option<BlockHeight>, CoreError>;

    /// Height of `hash` at or below `tip`, or `None` if no height matches.
    async fn height_of(
        &self,
        hash: &BlockHash,
        tip: BlockHeight,
    ) -> Result<Option<BlockHeight>, CoreError> {
        self.height_within(hash, BlockHeight(0), tip).await
    }

    /// Record a pairing learned elsewhere (e.g. while paginating by height).
    async fn remember(&self, _hash: BlockHash, _height: BlockHeight) {}
}

// ==============================================================================
// Linear Scan
// ==============================================================================

/// Walks heights from the tip down to genesis with `getblockhash` until one
/// matches. O(tip) round trips per lookup.
///
/// A node error at a single height is skipped; anything else (unreachable
/// node, garbage response) aborts the walk.
pub struct LinearScan {
    rpc: Arc<dyn NodeRpc>,
}

impl LinearScan {
    pub fn new(rpc: Arc<dyn NodeRpc>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl HeightIndex for LinearScan {
    async fn height_within(
        &self,
        hash: &BlockHash,
        floor: BlockHeight,
        tip: BlockHeight,
    ) -> Result<Option<BlockHeight>, CoreError> {
        debug!(%hash, %floor, %tip, "scanning for block height");
        for h in (floor.0..=tip.0).rev() {
            match self.rpc.get_block_hash(BlockHeight(h)).await {
                Ok(candidate) if candidate == *hash => return Ok(Some(BlockHeight(h))),
                Ok(_) => {}
                Err(CoreError::Rpc(err)) if err.is_lookup_miss() => {
                    warn!(height = h, error = %err, "skipping height during scan");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

// ==============================================================================
// Memoised Index
// ==============================================================================

/// Bounded LRU memo in front of another index. Only successful lookups are
/// stored, so a miss is retried on the next request.
pub struct CachedHeightIndex<I> {
    inner: I,
    memo: Mutex<LruCache<BlockHash, BlockHeight>>,
}

impl<I: HeightIndex> CachedHeightIndex<I> {
    pub fn new(inner: I, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            memo: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.memo.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memo.lock().await.is_empty()
    }
}

#[async_trait]
impl<I: HeightIndex> HeightIndex for CachedHeightIndex<I> {
    async fn height_within(
        &self,
        hash: &BlockHash,
        floor: BlockHeight,
        tip: BlockHeight,
    ) -> Result<Option<BlockHeight>, CoreError> {
        if let Some(height) = self.memo.lock().await.get(hash).copied() {
            return Ok(Some(height));
        }

        // The lock is not held across the scan; two concurrent misses for the
        // same hash both scan and store the same answer.
        let found = self.inner.height_within(hash, floor, tip).await?;
        if let Some(height) = found {
            self.memo.lock().await.put(*hash, height);
        }
        Ok(found)
    }

    async fn remember(&self, hash: BlockHash, height: BlockHeight) {
        self.memo.lock().await.put(hash, height);
    }
}
