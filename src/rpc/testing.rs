//! Scripted in-process node for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use crate::rpc::client::NodeRpc;
use crate::rpc::types::{NodeErrorObject, RpcEnvelope, RpcError, RpcResult, WalletScope};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub scope: WalletScope,
}

/// Answers each method from a queue of scripted replies and records calls.
/// A method with nothing queued fails as a transport error.
#[derive(Default)]
pub struct ScriptedNode {
    replies: Mutex<HashMap<String, VecDeque<RpcResult<RpcEnvelope>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, to hold a call open.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(&self, method: &str, reply: RpcResult<RpcEnvelope>) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn ok(&self, method: &str, result: Value) -> &Self {
        self.push(
            method,
            Ok(RpcEnvelope {
                result: Some(result),
                error: None,
                id: String::new(),
            }),
        );
        self
    }

    pub fn node_error(&self, method: &str, code: i64, message: &str) -> &Self {
        self.push(
            method,
            Ok(RpcEnvelope {
                result: None,
                error: Some(NodeErrorObject {
                    code,
                    message: message.to_string(),
                }),
                id: String::new(),
            }),
        );
        self
    }

    pub fn fail(&self, method: &str, error: RpcError) -> &Self {
        self.push(method, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }
}

impl NodeRpc for ScriptedNode {
    async fn call_raw(
        &self,
        method: &str,
        params: Value,
        scope: &WalletScope,
    ) -> RpcResult<RpcEnvelope> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params,
            scope: scope.clone(),
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        reply.unwrap_or_else(|| Err(RpcError::Transport(format!("no reply scripted for {}", method))))
    }
}

pub fn blockchain_info() -> Value {
    json!({
        "chain": "regtest", "blocks": 150, "headers": 150,
        "bestblockhash": "0f".repeat(32), "difficulty": 4.6e-10,
        "time": 1700000000, "mediantime": 1700000000,
        "verificationprogress": 1.0, "initialblockdownload": false,
        "chainwork": "0000012c", "size_on_disk": 45000, "pruned": false,
        "warnings": ""
    })
}

pub fn mempool_info() -> Value {
    json!({
        "loaded": true, "size": 2, "bytes": 450, "usage": 2800,
        "total_fee": 0.00002, "maxmempool": 300000000,
        "mempoolminfee": 0.00001, "minrelaytxfee": 0.00001
    })
}

pub fn mining_info() -> Value {
    json!({
        "blocks": 150, "difficulty": 4.6e-10, "networkhashps": 0.0012,
        "pooledtx": 2, "chain": "regtest", "warnings": []
    })
}

pub fn network_info() -> Value {
    json!({
        "version": 270000, "subversion": "/Satoshi:27.0.0/", "protocolversion": 70016,
        "networkactive": true, "connections": 0, "relayfee": 0.00001
    })
}

/// `gettxout` answer for an output still in the mempool.
pub fn tx_out(btc: f64) -> Value {
    json!({
        "bestblock": "0f".repeat(32), "confirmations": 0, "value": btc,
        "scriptPubKey": {
            "asm": "0 ab", "hex": "0014ab", "address": "bcrt1qowned",
            "type": "witness_v0_keyhash"
        },
        "coinbase": false
    })
}

pub fn unspent(txid: &str, vout: u32, btc: f64) -> Value {
    json!({
        "txid": txid, "vout": vout, "address": "bcrt1qowned",
        "amount": btc, "confirmations": 6,
        "spendable": true, "solvable": true, "safe": true
    })
}
