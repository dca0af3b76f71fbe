//! Node JSON-RPC abstraction layer.
//!
//! Defines the [`NodeRpc`] trait and provides an HTTP JSON-RPC 1.0
//! implementation ([`HttpRpcClient`]) plus a test mock (`mock::MockRpc`).
//!
//! Implementors supply [`NodeRpc::call`]; every node command is a provided
//! method that fixes the method name, marshals its positional parameters and
//! decodes the result. Wrappers add no error translation of their own.

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub(crate) mod parsing;
pub mod types;

pub use http_adapter::HttpRpcClient;
pub use types::{
    AddressValidation, ListedTransaction, NodeBlock, NodeInfo, PeerInfo, RawTransaction,
    ReceivedByAddress,
};

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash, SignedAmount, Txid};
use serde_json::{json, Value};

use crate::error::CoreError;
use crate::types::{BlockHeight, Utxo, WalletTransaction};

use parsing::{decode, parse_btc_amount, parse_integer_required, parse_signed_btc_amount};

/// Upper confirmation bound passed to `listunspent` when "all" is meant.
pub const MAX_CONFIRMATIONS: u32 = 9_999_999;

#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Issue one JSON-RPC request and return its unwrapped `result`.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, CoreError>;

    // ==========================================================================
    // Chain
    // ==========================================================================

    async fn get_info(&self) -> Result<NodeInfo, CoreError> {
        decode(self.call("getinfo", Vec::new()).await?, "getinfo")
    }

    async fn get_block_count(&self) -> Result<BlockHeight, CoreError> {
        let raw = self.call("getblockcount", Vec::new()).await?;
        parse_integer_required::<u32>(&raw, "getblockcount").map(BlockHeight)
    }

    async fn get_best_block_hash(&self) -> Result<BlockHash, CoreError> {
        decode(
            self.call("getbestblockhash", Vec::new()).await?,
            "getbestblockhash",
        )
    }

    async fn get_block_hash(&self, height: BlockHeight) -> Result<BlockHash, CoreError> {
        decode(
            self.call("getblockhash", vec![json!(height.0)]).await?,
            "getblockhash",
        )
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<NodeBlock, CoreError> {
        decode(
            self.call("getblock", vec![json!(hash.to_string())]).await?,
            "getblock",
        )
    }

    async fn get_difficulty(&self) -> Result<f64, CoreError> {
        decode(self.call("getdifficulty", Vec::new()).await?, "getdifficulty")
    }

    async fn get_raw_mempool(&self) -> Result<Vec<Txid>, CoreError> {
        decode(self.call("getrawmempool", Vec::new()).await?, "getrawmempool")
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    async fn get_transaction(&self, txid: &Txid) -> Result<WalletTransaction, CoreError> {
        decode(
            self.call("gettransaction", vec![json!(txid.to_string())])
                .await?,
            "gettransaction",
        )
    }

    async fn get_raw_transaction(&self, txid: &Txid) -> Result<RawTransaction, CoreError> {
        decode(
            self.call("getrawtransaction", vec![json!(txid.to_string()), json!(1)])
                .await?,
            "getrawtransaction",
        )
    }

    /// Serialized transaction hex (`getrawtransaction <txid> 0`).
    async fn get_raw_transaction_hex(&self, txid: &Txid) -> Result<String, CoreError> {
        decode(
            self.call("getrawtransaction", vec![json!(txid.to_string()), json!(0)])
                .await?,
            "getrawtransaction",
        )
    }

    // ==========================================================================
    // Network
    // ==========================================================================

    async fn get_connection_count(&self) -> Result<u32, CoreError> {
        let raw = self.call("getconnectioncount", Vec::new()).await?;
        parse_integer_required(&raw, "getconnectioncount")
    }

    async fn get_peer_info(&self) -> Result<Vec<PeerInfo>, CoreError> {
        decode(self.call("getpeerinfo", Vec::new()).await?, "getpeerinfo")
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    async fn validate_address(&self, address: &str) -> Result<AddressValidation, CoreError> {
        decode(
            self.call("validateaddress", vec![json!(address)]).await?,
            "validateaddress",
        )
    }

    async fn get_received_by_address(
        &self,
        address: &str,
        minconf: u32,
    ) -> Result<Amount, CoreError> {
        let raw = self
            .call("getreceivedbyaddress", vec![json!(address), json!(minconf)])
            .await?;
        parse_btc_amount(&raw)
    }

    async fn list_received_by_address(
        &self,
        minconf: u32,
        include_empty: bool,
    ) -> Result<Vec<ReceivedByAddress>, CoreError> {
        decode(
            self.call(
                "listreceivedbyaddress",
                vec![json!(minconf), json!(include_empty)],
            )
            .await?,
            "listreceivedbyaddress",
        )
    }

    /// `addresses` restricts the result to outputs paying those addresses.
    async fn list_unspent(
        &self,
        minconf: u32,
        maxconf: u32,
        addresses: Option<&[String]>,
    ) -> Result<Vec<Utxo>, CoreError> {
        let mut params = vec![json!(minconf), json!(maxconf)];
        if let Some(addresses) = addresses {
            params.push(json!(addresses));
        }
        decode(self.call("listunspent", params).await?, "listunspent")
    }

    // ==========================================================================
    // Wallet
    // ==========================================================================

    async fn get_balance(&self) -> Result<SignedAmount, CoreError> {
        let raw = self.call("getbalance", Vec::new()).await?;
        parse_signed_btc_amount(&raw)
    }

    async fn get_new_address(&self, label: Option<&str>) -> Result<String, CoreError> {
        let params = match label {
            Some(label) if !label.is_empty() => vec![json!(label)],
            _ => Vec::new(),
        };
        decode(self.call("getnewaddress", params).await?, "getnewaddress")
    }

    async fn set_label(&self, address: &str, label: &str) -> Result<(), CoreError> {
        self.call("setlabel", vec![json!(address), json!(label)])
            .await?;
        Ok(())
    }

    async fn get_label(&self, address: &str) -> Result<String, CoreError> {
        decode(
            self.call("getlabel", vec![json!(address)]).await?,
            "getlabel",
        )
    }

    /// Older daemons answer with an array of addresses, newer ones with an
    /// object keyed by address; both are accepted.
    async fn get_addresses_by_label(&self, label: &str) -> Result<Vec<String>, CoreError> {
        let raw = self
            .call("getaddressesbylabel", vec![json!(label)])
            .await?;
        match raw {
            Value::Object(map) => Ok(map.into_iter().map(|(address, _)| address).collect()),
            other => decode(other, "getaddressesbylabel"),
        }
    }

    /// A `comment_to` without a `comment` sends an empty comment so the
    /// positional parameters stay aligned.
    async fn send_to_address(
        &self,
        address: &str,
        amount: Amount,
        comment: Option<&str>,
        comment_to: Option<&str>,
    ) -> Result<Txid, CoreError> {
        let mut params = vec![json!(address), json!(amount.to_btc())];
        match (comment, comment_to) {
            (comment, Some(to)) => {
                params.push(json!(comment.unwrap_or("")));
                params.push(json!(to));
            }
            (Some(comment), None) => params.push(json!(comment)),
            (None, None) => {}
        }
        decode(self.call("sendtoaddress", params).await?, "sendtoaddress")
    }

    async fn list_transactions(
        &self,
        count: u32,
        include_generated: bool,
    ) -> Result<Vec<ListedTransaction>, CoreError> {
        decode(
            self.call(
                "listtransactions",
                vec![json!(count), json!(include_generated)],
            )
            .await?,
            "listtransactions",
        )
    }

    // ==========================================================================
    // Mining
    // ==========================================================================

    async fn get_generate(&self) -> Result<bool, CoreError> {
        decode(self.call("getgenerate", Vec::new()).await?, "getgenerate")
    }

    /// `genproclimit` of -1 means "all processors".
    async fn set_generate(&self, generate: bool, genproclimit: i32) -> Result<(), CoreError> {
        self.call("setgenerate", vec![json!(generate), json!(genproclimit)])
            .await?;
        Ok(())
    }
}
