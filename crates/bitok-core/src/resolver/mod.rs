//! Query resolution over the node RPC.
//!
//! Everything the explorer shows is assembled here from fresh node calls:
//! blocks by height or hash (with the hash-to-height lookup behind
//! [`HeightIndex`]), wallet transactions, address details, the paginated
//! block list, and free-text search. Node-reported lookup failures become
//! [`NotFound`]; transport and protocol failures propagate unchanged.

mod height;
mod pagination;
mod query;

pub use height::{CachedHeightIndex, HeightIndex, LinearScan};
pub use pagination::{page_window, total_pages};
pub use query::{SearchQuery, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN};

use std::sync::Arc;

use bitcoin::{Amount, BlockHash, Txid};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, NotFound};
use crate::network::{estimate_hashrate, NetworkStatus};
use crate::rpc::{NodeRpc, RawTransaction, MAX_CONFIRMATIONS};
use crate::types::{AddressDetails, Block, BlockHeight, BlockPage, Dashboard, WalletTransaction};

/// Number of blocks shown on the dashboard.
pub const RECENT_BLOCKS: u32 = 10;

/// Confirmations after which received coins count as confirmed.
pub const CONFIRMED_DEPTH: u32 = 6;

/// What a free-text search resolved to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SearchHit {
    Block(Block),
    Transaction(WalletTransaction),
    Address(AddressDetails),
}

pub struct Resolver {
    rpc: Arc<dyn NodeRpc>,
    status: Arc<NetworkStatus>,
    heights: Arc<dyn HeightIndex>,
}

impl Resolver {
    pub fn new(
        rpc: Arc<dyn NodeRpc>,
        status: Arc<NetworkStatus>,
        heights: Arc<dyn HeightIndex>,
    ) -> Self {
        Self {
            rpc,
            status,
            heights,
        }
    }

    pub fn rpc(&self) -> &Arc<dyn NodeRpc> {
        &self.rpc
    }

    pub fn status(&self) -> &Arc<NetworkStatus> {
        &self.status
    }

    // ==========================================================================
    // Search
    // ==========================================================================

    /// Classify `query` and dispatch it. A 64-hex-character query is tried as
    /// a block first, then as a wallet transaction.
    pub async fn search(&self, query: &str) -> Result<SearchHit, CoreError> {
        match SearchQuery::classify(query) {
            SearchQuery::Height(Some(height)) => {
                self.block_at(BlockHeight(height)).await.map(SearchHit::Block)
            }
            SearchQuery::Height(None) => Err(NotFound::Query(query.trim().to_owned()).into()),
            SearchQuery::BlockOrTx(hex) => self.lookup_block_or_transaction(&hex).await,
            SearchQuery::Address(address) => self
                .resolve_address(&address)
                .await
                .map(SearchHit::Address),
            SearchQuery::Invalid(q) => Err(CoreError::InvalidInput(format!(
                "`{q}` is not a block height, hash, transaction id or address"
            ))),
        }
    }

    async fn lookup_block_or_transaction(&self, hex: &str) -> Result<SearchHit, CoreError> {
        let hash: BlockHash = parse_hex(hex)?;
        match self.block_by_hash(&hash).await {
            Ok(block) => return Ok(SearchHit::Block(block)),
            Err(CoreError::NotFound(_)) => {
                debug!(query = hex, "no block with this hash, trying wallet transaction");
            }
            Err(err) => return Err(err),
        }

        let txid: Txid = parse_hex(hex)?;
        self.rpc
            .get_transaction(&txid)
            .await
            .map(SearchHit::Transaction)
            .map_err(|err| err.into_not_found(|| NotFound::Query(hex.to_owned())))
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    /// Resolve a block from a decimal height or a block hash.
    pub async fn resolve_block(&self, id: &str) -> Result<Block, CoreError> {
        let id = id.trim();
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            let height: u32 = id
                .parse()
                .map_err(|_| NotFound::Block(id.to_owned()))?;
            return self.block_at(BlockHeight(height)).await;
        }
        let hash: BlockHash = id
            .parse()
            .map_err(|_| NotFound::Block(id.to_owned()))?;
        self.block_by_hash(&hash).await
    }

    /// `getblockhash` then `getblock`. The height is known, so no scan runs.
    pub async fn block_at(&self, height: BlockHeight) -> Result<Block, CoreError> {
        let hash = self
            .rpc
            .get_block_hash(height)
            .await
            .map_err(|err| err.into_not_found(|| NotFound::Height(u64::from(height.0))))?;
        let node = self
            .rpc
            .get_block(&hash)
            .await
            .map_err(|err| err.into_not_found(|| NotFound::Block(hash.to_string())))?;
        self.heights.remember(hash, height).await;
        Ok(Block::from_node(node, height))
    }

    /// `getblock`, then derive the height from the hash.
    pub async fn block_by_hash(&self, hash: &BlockHash) -> Result<Block, CoreError> {
        let node = self
            .rpc
            .get_block(hash)
            .await
            .map_err(|err| err.into_not_found(|| NotFound::Block(hash.to_string())))?;
        let height = if node.previous_block_hash.is_none() {
            BlockHeight(0)
        } else {
            self.resolve_height(hash).await?
        };
        Ok(Block::from_node(node, height))
    }

    /// Height of `hash`, or 0 when no height matches.
    ///
    /// The scan starts from the snapshot tip. On a miss the node's block
    /// count is asked once, and only heights above the snapshot tip are
    /// scanned again.
    pub async fn resolve_height(&self, hash: &BlockHash) -> Result<BlockHeight, CoreError> {
        let tip = self.status.tip().await?;
        if let Some(height) = self.heights.height_of(hash, tip).await? {
            return Ok(height);
        }

        let latest = self.rpc.get_block_count().await?;
        if latest > tip {
            debug!(%hash, %tip, %latest, "snapshot tip is stale, scanning new heights");
            let floor = BlockHeight(tip.0 + 1);
            if let Some(height) = self.heights.height_within(hash, floor, latest).await? {
                return Ok(height);
            }
        }
        debug!(%hash, %latest, "no height matched, reporting 0");
        Ok(BlockHeight(0))
    }

    /// One page of the block list, newest first.
    pub async fn paginate(&self, page: u32, page_size: u32) -> Result<BlockPage, CoreError> {
        let tip = self.status.tip().await?;
        let total_pages = total_pages(tip, page_size)?;
        let blocks = match page_window(tip, page, page_size)? {
            Some(window) => self.blocks_descending(window.rev()).await?,
            None => Vec::new(),
        };
        Ok(BlockPage {
            page,
            page_size,
            total_pages,
            tip,
            blocks,
        })
    }

    /// The newest [`RECENT_BLOCKS`] blocks, newest first.
    pub async fn recent_blocks(&self) -> Result<Vec<Block>, CoreError> {
        let tip = self.status.tip().await?;
        let lowest = tip.0.saturating_sub(RECENT_BLOCKS - 1);
        self.blocks_descending((lowest..=tip.0).rev()).await
    }

    /// Fetch heights concurrently, keeping the given order. Each height's
    /// hash and block lookups stay sequential.
    async fn blocks_descending(
        &self,
        heights: impl Iterator<Item = u32>,
    ) -> Result<Vec<Block>, CoreError> {
        try_join_all(heights.map(|h| self.block_at(BlockHeight(h)))).await
    }

    pub async fn dashboard(&self) -> Result<Dashboard, CoreError> {
        let info = self.status.info().await?;
        let recent_blocks = self.recent_blocks().await?;
        Ok(Dashboard {
            hashrate: estimate_hashrate(info.difficulty),
            info,
            recent_blocks,
        })
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    /// Look up a transaction through the node's wallet. The node only knows
    /// wallet transactions, so a node-reported failure means "outside the
    /// wallet" rather than "does not exist".
    pub async fn resolve_transaction(&self, txid: &str) -> Result<WalletTransaction, CoreError> {
        let txid: Txid = parse_txid(txid)?;
        self.rpc
            .get_transaction(&txid)
            .await
            .map_err(|err| err.into_not_found(|| NotFound::OutsideWallet(txid)))
    }

    /// Decoded transaction via `getrawtransaction`, for nodes that have it.
    pub async fn raw_transaction(&self, txid: &str) -> Result<RawTransaction, CoreError> {
        let txid: Txid = parse_txid(txid)?;
        self.rpc
            .get_raw_transaction(&txid)
            .await
            .map_err(|err| err.into_not_found(|| NotFound::Transaction(txid)))
    }

    pub async fn mempool(&self) -> Result<Vec<Txid>, CoreError> {
        self.rpc.get_raw_mempool().await
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    /// Received totals for any valid address; balance and unspent outputs
    /// only for addresses the wallet owns. The independent lookups run
    /// concurrently.
    pub async fn resolve_address(&self, address: &str) -> Result<AddressDetails, CoreError> {
        let address = address.trim();
        let validation = self.rpc.validate_address(address).await?;
        if !validation.is_valid {
            return Err(CoreError::InvalidInput(format!(
                "`{address}` is not a valid address"
            )));
        }
        let in_wallet = validation.is_mine;
        let filter = [address.to_owned()];

        let (received_unconfirmed, received_confirmed, utxos) = futures::try_join!(
            self.rpc.get_received_by_address(address, 0),
            self.rpc.get_received_by_address(address, CONFIRMED_DEPTH),
            async {
                if in_wallet {
                    self.rpc
                        .list_unspent(0, MAX_CONFIRMATIONS, Some(filter.as_slice()))
                        .await
                } else {
                    Ok(Vec::new())
                }
            },
        )?;

        let balance = if in_wallet {
            let total = utxos
                .iter()
                .try_fold(Amount::ZERO, |acc, utxo| acc.checked_add(utxo.amount))
                .ok_or_else(|| {
                    CoreError::InvalidData(format!("balance of {address} overflows"))
                })?;
            Some(total)
        } else {
            None
        };

        Ok(AddressDetails {
            address: address.to_owned(),
            in_wallet,
            received_unconfirmed,
            received_confirmed,
            balance,
            utxos,
        })
    }
}

fn parse_hex<T: std::str::FromStr>(hex: &str) -> Result<T, CoreError> {
    hex.parse()
        .map_err(|_| CoreError::InvalidInput(format!("`{hex}` is not a 64-character hex hash")))
}

fn parse_txid(txid: &str) -> Result<Txid, CoreError> {
    parse_hex(txid.trim())
}
