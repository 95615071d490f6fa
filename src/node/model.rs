//! Response types for node-level (non-wallet) RPC methods.

use bitcoin::Amount;
use serde::{Deserialize, Serialize};

/// `getblockchaininfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    pub bestblockhash: String,
    pub difficulty: f64,
    #[serde(default)]
    pub time: u64,
    pub mediantime: u64,
    pub verificationprogress: f64,
    pub initialblockdownload: bool,
    pub chainwork: String,
    pub size_on_disk: u64,
    pub pruned: bool,
    #[serde(default)]
    pub warnings: Warnings,
}

/// Node warnings: a string on older nodes, a list on newer ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Warnings {
    List(Vec<String>),
    Text(String),
}

impl Default for Warnings {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Warnings {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

/// `getmempoolinfo` result. Fee rates are BTC/kvB as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolInfo {
    pub loaded: bool,
    pub size: u64,
    pub bytes: u64,
    pub usage: u64,
    #[serde(default)]
    pub total_fee: f64,
    pub maxmempool: u64,
    pub mempoolminfee: f64,
    pub minrelaytxfee: f64,
    #[serde(default)]
    pub incrementalrelayfee: f64,
    #[serde(default)]
    pub unbroadcastcount: u64,
    #[serde(default)]
    pub fullrbf: bool,
}

/// `getmininginfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningInfo {
    pub blocks: u64,
    pub difficulty: f64,
    pub networkhashps: f64,
    pub pooledtx: u64,
    pub chain: String,
    #[serde(default)]
    pub warnings: Warnings,
}

/// One entry of `getnetworkinfo().networks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReachability {
    pub name: String,
    pub limited: bool,
    pub reachable: bool,
    #[serde(default)]
    pub proxy: String,
    #[serde(default)]
    pub proxy_randomize_credentials: bool,
}

/// `getnetworkinfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub version: u64,
    pub subversion: String,
    pub protocolversion: u64,
    #[serde(default)]
    pub localservices: String,
    #[serde(default)]
    pub localservicesnames: Vec<String>,
    #[serde(default)]
    pub localrelay: bool,
    #[serde(default)]
    pub timeoffset: i64,
    pub networkactive: bool,
    pub connections: u32,
    #[serde(default)]
    pub connections_in: u32,
    #[serde(default)]
    pub connections_out: u32,
    #[serde(default)]
    pub networks: Vec<NetworkReachability>,
    pub relayfee: f64,
    #[serde(default)]
    pub incrementalfee: f64,
    #[serde(default)]
    pub localaddresses: Vec<serde_json::Value>,
    #[serde(default)]
    pub warnings: Warnings,
}

/// Everything the status page shows, fetched in one go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub blockchain: BlockchainInfo,
    pub mempool: MempoolInfo,
    pub mining: MiningInfo,
    pub network: NetworkInfo,
}

/// `getblock` result at verbosity 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub confirmations: i64,
    pub height: u64,
    pub version: i64,
    #[serde(rename = "versionHex")]
    pub version_hex: String,
    pub merkleroot: String,
    pub time: u64,
    pub mediantime: u64,
    pub nonce: u64,
    pub bits: String,
    pub difficulty: f64,
    pub chainwork: String,
    #[serde(rename = "nTx")]
    pub n_tx: u64,
    #[serde(default)]
    pub previousblockhash: Option<String>,
    #[serde(default)]
    pub nextblockhash: Option<String>,
    pub strippedsize: u64,
    pub size: u64,
    pub weight: u64,
    #[serde(default)]
    pub tx: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSig {
    pub asm: String,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub asm: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub hex: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Transaction input as decoded by the node. Coinbase inputs carry
/// `coinbase` instead of an outpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxIn {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub coinbase: Option<String>,
    #[serde(default, rename = "scriptSig")]
    pub script_sig: Option<ScriptSig>,
    #[serde(default)]
    pub txinwitness: Vec<String>,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOut {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

/// `gettxout` result. Spent or unknown outputs come back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentTxOut {
    pub bestblock: String,
    /// 0 while the creating transaction is in the mempool.
    pub confirmations: i64,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
    #[serde(default)]
    pub coinbase: bool,
}

/// `getrawtransaction` result with `verbose = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    pub hash: String,
    pub version: i64,
    pub size: u64,
    pub vsize: u64,
    pub weight: u64,
    pub locktime: u64,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub hex: String,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub confirmations: Option<i64>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(default)]
    pub blocktime: Option<u64>,
}
