//! RPC-specific payloads that do not belong to the shared domain model.
//!
//! Blocks, wallet transactions and unspent outputs live in `crate::types`;
//! this module holds the shapes of the remaining node commands.

use bitcoin::{Amount, BlockHash, OutPoint, ScriptBuf, SignedAmount, TxMerkleNode, Txid};
use serde::{Deserialize, Serialize};

use super::parsing;
use crate::script::{derive_addresses, ScriptClass};

// ==============================================================================
// Node Info
// ==============================================================================

/// Node summary from `getinfo`. Only `blocks` is required; old daemons omit
/// several of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub version: i64,
    pub blocks: u32,
    #[serde(default)]
    pub connections: u32,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub testnet: bool,
    #[serde(default)]
    pub generate: bool,
    #[serde(default)]
    pub errors: String,
}

/// One connected peer from `getpeerinfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub addr: String,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub subver: Option<String>,
    #[serde(default)]
    pub inbound: Option<bool>,
    #[serde(default)]
    pub conntime: Option<u64>,
    #[serde(default)]
    pub startingheight: Option<i64>,
}

// ==============================================================================
// Blocks
// ==============================================================================

/// Raw `getblock` payload. The node does not reliably echo a height, so the
/// resolver attaches one to build a [`crate::types::Block`].
#[derive(Debug, Clone, Deserialize)]
pub struct NodeBlock {
    pub hash: BlockHash,
    pub time: u64,
    pub difficulty: f64,
    pub nonce: u64,
    #[serde(rename = "merkleroot")]
    pub merkle_root: TxMerkleNode,
    #[serde(rename = "previousblockhash", default)]
    pub previous_block_hash: Option<BlockHash>,
    pub tx: Vec<Txid>,
}

// ==============================================================================
// Addresses
// ==============================================================================

/// `validateaddress` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressValidation {
    #[serde(rename(deserialize = "isvalid"))]
    pub is_valid: bool,
    #[serde(rename(deserialize = "ismine"), default)]
    pub is_mine: bool,
    #[serde(default)]
    pub address: Option<String>,
}

/// One row of `listreceivedbyaddress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedByAddress {
    pub address: String,
    #[serde(alias = "account", default)]
    pub label: Option<String>,
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::btc_amount"
    )]
    pub amount: Amount,
    #[serde(default)]
    pub confirmations: u64,
}

// ==============================================================================
// Wallet History
// ==============================================================================

/// One row of `listtransactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedTransaction {
    pub category: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::signed_btc_amount"
    )]
    pub amount: SignedAmount,
    #[serde(
        default,
        serialize_with = "bitcoin::amount::serde::as_btc::opt::serialize",
        deserialize_with = "parsing::opt_signed_btc_amount"
    )]
    pub fee: Option<SignedAmount>,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub txid: Option<Txid>,
    #[serde(default)]
    pub time: Option<u64>,
}

// ==============================================================================
// Raw Transactions
// ==============================================================================

/// Decoded `getrawtransaction <txid> 1` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: Txid,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub locktime: u32,
    #[serde(rename(deserialize = "blockhash"), default)]
    pub block_hash: Option<BlockHash>,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(rename(deserialize = "vin"))]
    pub inputs: Vec<RawInput>,
    #[serde(rename(deserialize = "vout"))]
    pub outputs: Vec<RawOutput>,
}

impl RawTransaction {
    /// A coinbase transaction has exactly one input without a prevout.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout().is_none()
    }

    /// Sum of all output values; `None` on overflow.
    pub fn total_output(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(Amount::ZERO, |acc, out| acc.checked_add(out.value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub txid: Option<Txid>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub coinbase: Option<String>,
    #[serde(default)]
    pub sequence: u32,
}

impl RawInput {
    /// The outpoint being spent. `None` for coinbase inputs.
    pub fn prevout(&self) -> Option<OutPoint> {
        if self.coinbase.is_some() {
            return None;
        }
        match (self.txid, self.vout) {
            (Some(txid), Some(vout)) => Some(OutPoint::new(txid, vout)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOutput {
    #[serde(
        serialize_with = "bitcoin::amount::serde::as_btc::serialize",
        deserialize_with = "parsing::btc_amount"
    )]
    pub value: Amount,
    pub n: u32,
    #[serde(rename(deserialize = "scriptPubKey"), default)]
    pub script_pub_key: ScriptPubKey,
}

/// An output script as the node reports it, completed locally: `class` and
/// `asm` come from decoding `hex`, and `addresses` is derived from the script
/// when the node leaves it empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "NodeScriptPubKey")]
pub struct ScriptPubKey {
    pub hex: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub addresses: Vec<String>,
    pub asm: Option<String>,
    /// `None` when `hex` is missing or not hex.
    pub class: Option<ScriptClass>,
}

#[derive(Deserialize)]
struct NodeScriptPubKey {
    #[serde(default)]
    hex: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    addresses: Vec<String>,
    #[serde(default)]
    asm: Option<String>,
}

impl From<NodeScriptPubKey> for ScriptPubKey {
    fn from(node: NodeScriptPubKey) -> Self {
        let script = node
            .hex
            .as_deref()
            .and_then(|hex| ScriptBuf::from_hex(hex).ok());
        let Some(script) = script else {
            return Self {
                hex: node.hex,
                kind: node.kind,
                addresses: node.addresses,
                asm: node.asm,
                class: None,
            };
        };

        let addresses = if node.addresses.is_empty() {
            derive_addresses(&script)
        } else {
            node.addresses
        };
        Self {
            hex: node.hex,
            kind: node.kind,
            addresses,
            asm: Some(node.asm.unwrap_or_else(|| script.to_asm_string())),
            class: Some(ScriptClass::of(&script)),
        }
    }
}
