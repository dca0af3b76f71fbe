//! Shared test helpers for `bitok-core` unit tests.
//!
//! Deterministic hashes and canned node payloads, so that tests across
//! modules agree on what "the block at height 5" looks like.

use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Txid};

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// Deterministic hash for the block at `height` in a mock chain.
pub fn block_hash_at(height: u32) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&height.to_le_bytes());
    bytes[31] = 0xb1;
    BlockHash::from_byte_array(bytes)
}

/// Coinbase txid of the block at `height` in a mock chain.
pub fn coinbase_txid_at(height: u32) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&height.to_le_bytes());
    bytes[31] = 0xc0;
    Txid::from_byte_array(bytes)
}

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

// ==============================================================================
// Node Payloads
// ==============================================================================

/// `getblock` payload for the block at `height` in a mock chain.
pub fn block_json(height: u32) -> serde_json::Value {
    let mut block = serde_json::json!({
        "hash": block_hash_at(height).to_string(),
        "time": 1_231_006_505u64 + u64::from(height) * 600,
        "difficulty": 1.0,
        "nonce": 2_083_236_893u64 + u64::from(height),
        "merkleroot": coinbase_txid_at(height).to_string(),
        "tx": [coinbase_txid_at(height).to_string()],
    });
    if height > 0 {
        block["previousblockhash"] = serde_json::json!(block_hash_at(height - 1).to_string());
    }
    block
}

/// `gettransaction` payload for a confirmed wallet receive.
pub fn wallet_tx_json(txid: Txid, btc: f64, address: &str) -> serde_json::Value {
    serde_json::json!({
        "txid": txid.to_string(),
        "amount": btc,
        "confirmations": 6,
        "time": 1_700_000_000u64,
        "blockhash": block_hash_at(1).to_string(),
        "details": [{ "category": "receive", "address": address, "amount": btc }],
    })
}

/// A 34-character P2PKH-style address.
pub const WALLET_ADDRESS: &str = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT";

/// A 34-character address not owned by the mock wallet.
pub const FOREIGN_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
