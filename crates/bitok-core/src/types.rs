//! Domain types for the explorer's view of the node.
//!
//! Everything here is fetched fresh per request and never mutated in place:
//! blocks with their derived height, wallet-scoped transactions, unspent
//! outputs, and the composite views the resolver assembles.

use bitcoin::{Amount, BlockHash, SignedAmount, TxMerkleNode, Txid};
use serde::{Deserialize, Serialize};

use crate::rpc::types::{NodeBlock, NodeInfo};
use crate::rpc::parsing;

// ==============================================================================
// Block Height
// ==============================================================================

/// A block height, wrapped for type safety.
///
/// `#[serde(transparent)]` keeps the JSON representation a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u32);

impl From<u32> for BlockHeight {
    fn from(h: u32) -> Self {
        Self(h)
    }
}

impl From<BlockHeight> for u32 {
    fn from(h: BlockHeight) -> Self {
        h.0
    }
}

impl std::ops::Deref for BlockHeight {
    type Target = u32;
    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Blocks
// ==============================================================================

/// A block together with the height the resolver derived for it.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub hash: BlockHash,
    pub height: BlockHeight,
    pub time: u64,
    pub difficulty: f64,
    pub nonce: u64,
    pub merkle_root: TxMerkleNode,
    /// `None` only for the genesis block.
    pub previous_block_hash: Option<BlockHash>,
    pub tx: Vec<Txid>,
}

impl Block {
    pub fn from_node(node: NodeBlock, height: BlockHeight) -> Self {
        Self {
            hash: node.hash,
            height,
            time: node.time,
            difficulty: node.difficulty,
            nonce: node.nonce,
            merkle_root: node.merkle_root,
            previous_block_hash: node.previous_block_hash,
            tx: node.tx,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_block_hash.is_none()
    }
}

// ==============================================================================
// Wallet Transactions
// ==============================================================================

/// A transaction as seen by the node's wallet (`gettransaction`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub txid: Txid,
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::signed_btc_amount"
    )]
    pub amount: SignedAmount,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(
        default,
        serialize_with = "bitcoin::amount::serde::as_btc::opt::serialize",
        deserialize_with = "parsing::opt_signed_btc_amount"
    )]
    pub fee: Option<SignedAmount>,
    #[serde(rename(deserialize = "blockhash"), default)]
    pub block_hash: Option<BlockHash>,
    #[serde(default)]
    pub details: Vec<TxDetail>,
}

impl WalletTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.confirmations > 0
    }
}

/// Per-address breakdown of a wallet transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxDetail {
    pub category: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::signed_btc_amount"
    )]
    pub amount: SignedAmount,
}

// ==============================================================================
// Addresses
// ==============================================================================

/// An unspent output from `listunspent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::btc_amount"
    )]
    pub amount: Amount,
    #[serde(default)]
    pub address: Option<String>,
}

/// Everything the explorer can say about an address.
///
/// `balance` and `utxos` are only ever populated for addresses owned by the
/// connected wallet; the node exposes nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct AddressDetails {
    pub address: String,
    pub in_wallet: bool,
    /// Total received with zero or more confirmations.
    #[serde(serialize_with = "bitcoin::amount::serde::as_btc::serialize")]
    pub received_unconfirmed: Amount,
    /// Total received with six or more confirmations.
    #[serde(serialize_with = "bitcoin::amount::serde::as_btc::serialize")]
    pub received_confirmed: Amount,
    #[serde(serialize_with = "bitcoin::amount::serde::as_btc::opt::serialize")]
    pub balance: Option<Amount>,
    pub utxos: Vec<Utxo>,
}

// ==============================================================================
// Composite Views
// ==============================================================================

/// One page of the descending block list.
#[derive(Debug, Clone, Serialize)]
pub struct BlockPage {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub tip: BlockHeight,
    pub blocks: Vec<Block>,
}

/// Network statistics plus the most recent blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub info: NodeInfo,
    /// Estimated network hashrate in hashes per second.
    pub hashrate: f64,
    pub recent_blocks: Vec<Block>,
}
