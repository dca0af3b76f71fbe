use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::Txid;
use serde_json::{json, Value};

use crate::error::{CoreError, RpcError};
use crate::test_util::{block_hash_at, block_json};

use super::NodeRpc;

/// A mock node for testing. Serves a synthetic chain plus canned wallet and
/// address data as raw JSON, so the typed wrappers decode exactly what a real
/// node would send. Every call is recorded.
pub struct MockRpc {
    chain_len: u32,
    difficulty: f64,
    connections: u32,
    wallet_txs: HashMap<Txid, Value>,
    addresses: HashMap<String, MockAddress>,
    mempool: Vec<Txid>,
    failing: HashSet<String>,
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

#[derive(Clone)]
pub struct MockAddress {
    pub is_mine: bool,
    pub received_unconfirmed: f64,
    pub received_confirmed: f64,
    pub utxos: Vec<Value>,
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            chain_len: 1,
            difficulty: 1.0,
            connections: 8,
            wallet_txs: HashMap::new(),
            addresses: HashMap::new(),
            mempool: Vec::new(),
            failing: HashSet::new(),
            responses: HashMap::new(),
        }
    }

    /// Parameters of the most recent call to `method`.
    pub fn last_params(&self, method: &str) -> Option<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    /// Every call so far, in issue order.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn tip(&self) -> u32 {
        self.chain_len.saturating_sub(1)
    }

    fn height_of(&self, hash: &str) -> Option<u32> {
        (0..self.chain_len).find(|h| block_hash_at(*h).to_string() == hash)
    }
}

pub struct MockRpcBuilder {
    chain_len: u32,
    difficulty: f64,
    connections: u32,
    wallet_txs: HashMap<Txid, Value>,
    addresses: HashMap<String, MockAddress>,
    mempool: Vec<Txid>,
    failing: HashSet<String>,
    responses: HashMap<String, Value>,
}

impl MockRpcBuilder {
    /// Chain with heights `0..=tip`.
    pub fn with_tip(mut self, tip: u32) -> Self {
        self.chain_len = tip + 1;
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_wallet_tx(mut self, txid: Txid, payload: Value) -> Self {
        self.wallet_txs.insert(txid, payload);
        self
    }

    pub fn with_address(mut self, address: &str, details: MockAddress) -> Self {
        self.addresses.insert(address.to_owned(), details);
        self
    }

    pub fn with_mempool(mut self, txids: Vec<Txid>) -> Self {
        self.mempool = txids;
        self
    }

    /// Make `method` fail with HTTP 503 at the transport level.
    pub fn failing(mut self, method: &str) -> Self {
        self.failing.insert(method.to_owned());
        self
    }

    /// Answer every call to `method` with `result`, whatever the params.
    pub fn with_response(mut self, method: &str, result: Value) -> Self {
        self.responses.insert(method.to_owned(), result);
        self
    }

    pub fn build(self) -> MockRpc {
        MockRpc {
            chain_len: self.chain_len,
            difficulty: self.difficulty,
            connections: self.connections,
            wallet_txs: self.wallet_txs,
            addresses: self.addresses,
            mempool: self.mempool,
            failing: self.failing,
            responses: self.responses,
            calls: Mutex::new(Vec::new()),
        }
    }
}

fn node_error(code: i64, message: &str) -> CoreError {
    CoreError::Rpc(RpcError::Node {
        code: Some(code),
        message: message.to_owned(),
    })
}

#[async_trait]
impl NodeRpc for MockRpc {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, CoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_owned(), params.clone()));

        if self.failing.contains(method) {
            return Err(CoreError::Rpc(RpcError::Http {
                status: 503,
                reason: "Service Unavailable".into(),
            }));
        }

        if let Some(result) = self.responses.get(method) {
            return Ok(result.clone());
        }

        match method {
            "getinfo" => Ok(json!({
                "version": 31900,
                "blocks": self.tip(),
                "connections": self.connections,
                "difficulty": self.difficulty,
                "testnet": false,
                "errors": "",
            })),
            "getblockcount" => Ok(json!(self.tip())),
            "getbestblockhash" => Ok(json!(block_hash_at(self.tip()).to_string())),
            "getdifficulty" => Ok(json!(self.difficulty)),
            "getconnectioncount" => Ok(json!(self.connections)),
            "getblockhash" => match params.first().and_then(Value::as_u64) {
                Some(h) if h < u64::from(self.chain_len) => {
                    Ok(json!(block_hash_at(h as u32).to_string()))
                }
                _ => Err(node_error(-1, "Block number out of range.")),
            },
            "getblock" => {
                let hash = params.first().and_then(Value::as_str).unwrap_or_default();
                self.height_of(hash)
                    .map(block_json)
                    .ok_or_else(|| node_error(-5, "Block not found"))
            }
            "gettransaction" => params
                .first()
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Txid>().ok())
                .and_then(|txid| self.wallet_txs.get(&txid).cloned())
                .ok_or_else(|| node_error(-5, "Invalid or non-wallet transaction id")),
            "getrawmempool" => Ok(json!(self
                .mempool
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>())),
            "validateaddress" => {
                let address = params.first().and_then(Value::as_str).unwrap_or_default();
                Ok(match self.addresses.get(address) {
                    Some(a) => json!({ "isvalid": true, "ismine": a.is_mine, "address": address }),
                    None => json!({ "isvalid": false }),
                })
            }
            "getreceivedbyaddress" => {
                let address = params.first().and_then(Value::as_str).unwrap_or_default();
                let minconf = params.get(1).and_then(Value::as_u64).unwrap_or(1);
                let a = self
                    .addresses
                    .get(address)
                    .ok_or_else(|| node_error(-5, "Invalid address"))?;
                Ok(json!(if minconf >= 6 {
                    a.received_confirmed
                } else {
                    a.received_unconfirmed
                }))
            }
            "listunspent" => {
                let filter: Vec<String> = params
                    .get(2)
                    .and_then(Value::as_array)
                    .map(|a| {
                        a.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default();
                let utxos: Vec<Value> = self
                    .addresses
                    .iter()
                    .filter(|(addr, a)| a.is_mine && (filter.is_empty() || filter.contains(addr)))
                    .flat_map(|(_, a)| a.utxos.clone())
                    .collect();
                Ok(json!(utxos))
            }
            _ => Err(node_error(-32601, "Method not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use bitcoin::Amount;

    #[tokio::test]
    async fn serves_a_linked_chain() {
        let rpc = MockRpc::builder().with_tip(3).build();
        let hash = rpc
            .get_block_hash(crate::types::BlockHeight(2))
            .await
            .expect("height 2 exists");
        assert_eq!(hash, block_hash_at(2));

        let block = rpc.get_block(&hash).await.expect("block 2 exists");
        assert_eq!(block.previous_block_hash, Some(block_hash_at(1)));
        assert_eq!(block.tx, vec![coinbase_txid_at(2)]);
    }

    #[tokio::test]
    async fn out_of_range_height_is_a_node_error() {
        let rpc = MockRpc::builder().with_tip(3).build();
        let err = rpc
            .get_block_hash(crate::types::BlockHeight(4))
            .await
            .expect_err("height 4 does not exist");
        assert!(matches!(err, CoreError::Rpc(RpcError::Node { .. })));
    }

    #[tokio::test]
    async fn list_unspent_honours_address_filter() {
        let rpc = MockRpc::builder()
            .with_address(
                WALLET_ADDRESS,
                MockAddress {
                    is_mine: true,
                    received_unconfirmed: 1.0,
                    received_confirmed: 1.0,
                    utxos: vec![json!({
                        "txid": txid_from_byte(1).to_string(),
                        "vout": 0,
                        "confirmations": 10,
                        "amount": 1.0,
                    })],
                },
            )
            .build();

        let filter = vec![WALLET_ADDRESS.to_owned()];
        let utxos = rpc
            .list_unspent(0, 9_999_999, Some(filter.as_slice()))
            .await
            .expect("listunspent must succeed");
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].amount, Amount::from_sat(100_000_000));

        let other = vec![FOREIGN_ADDRESS.to_owned()];
        let none = rpc
            .list_unspent(0, 9_999_999, Some(other.as_slice()))
            .await
            .expect("listunspent must succeed");
        assert!(none.is_empty());
    }
}
