//! Typed node queries.
//!
//! One RPC per function, except [`node_status`] (four concurrent calls) and
//! [`block_by_height`] (`getblockhash` then `getblock`). All go to the node
//! endpoint, never a wallet path.

use crate::node::model::{
    Block, BlockchainInfo, MempoolInfo, MiningInfo, NetworkInfo, NodeStatus, RawTransaction,
    UnspentTxOut,
};
use crate::rpc::methods::{
    GetBlock, GetBlockHash, GetBlockHashParams, GetBlockParams, GetBlockchainInfo, GetMempoolInfo,
    GetMiningInfo, GetNetworkInfo, GetRawMempool, GetRawMempoolParams, GetRawTransaction,
    GetRawTransactionParams, GetTxOut, GetTxOutParams, Help, HelpParams, ListWalletDir,
    ListWallets, LoadWallet, LoadWalletParams, NoParams, UnloadWallet, UnloadWalletParams,
};
use crate::rpc::{NodeRpc, RpcResult, WalletScope};
use crate::wallet::model::{WalletDir, WalletLoadResult};

const NODE: WalletScope = WalletScope::Node;

pub async fn blockchain_info<R: NodeRpc>(rpc: &R) -> RpcResult<BlockchainInfo> {
    rpc.request::<GetBlockchainInfo>(&NODE, &NoParams {}).await
}

pub async fn mempool_info<R: NodeRpc>(rpc: &R) -> RpcResult<MempoolInfo> {
    rpc.request::<GetMempoolInfo>(&NODE, &NoParams {}).await
}

pub async fn mining_info<R: NodeRpc>(rpc: &R) -> RpcResult<MiningInfo> {
    rpc.request::<GetMiningInfo>(&NODE, &NoParams {}).await
}

pub async fn network_info<R: NodeRpc>(rpc: &R) -> RpcResult<NetworkInfo> {
    rpc.request::<GetNetworkInfo>(&NODE, &NoParams {}).await
}

/// Fetch the four status sections concurrently. The first failure wins.
pub async fn node_status<R: NodeRpc>(rpc: &R) -> RpcResult<NodeStatus> {
    let (blockchain, mempool, mining, network) = tokio::try_join!(
        blockchain_info(rpc),
        mempool_info(rpc),
        mining_info(rpc),
        network_info(rpc),
    )?;
    Ok(NodeStatus {
        blockchain,
        mempool,
        mining,
        network,
    })
}

pub async fn block_by_hash<R: NodeRpc>(rpc: &R, hash: &str) -> RpcResult<Block> {
    let params = GetBlockParams {
        blockhash: hash.to_string(),
        verbosity: 1,
    };
    rpc.request::<GetBlock>(&NODE, &params).await
}

/// Resolve the hash at `height`, then fetch that block.
pub async fn block_by_height<R: NodeRpc>(rpc: &R, height: u64) -> RpcResult<Block> {
    let hash = rpc
        .request::<GetBlockHash>(&NODE, &GetBlockHashParams { height })
        .await?;
    block_by_hash(rpc, &hash).await
}

/// Decoded transaction. Needs `-txindex` on the node unless it is in the
/// mempool or a wallet transaction.
pub async fn raw_transaction<R: NodeRpc>(rpc: &R, txid: &str) -> RpcResult<RawTransaction> {
    let params = GetRawTransactionParams {
        txid: txid.to_string(),
        verbose: true,
    };
    rpc.request::<GetRawTransaction>(&NODE, &params).await
}

/// Unspent output, mempool included. `None` when spent or unknown.
pub async fn tx_out<R: NodeRpc>(rpc: &R, txid: &str, vout: u32) -> RpcResult<Option<UnspentTxOut>> {
    let params = GetTxOutParams {
        txid: txid.to_string(),
        n: vout,
        include_mempool: true,
    };
    rpc.request::<GetTxOut>(&NODE, &params).await
}

pub async fn raw_mempool<R: NodeRpc>(rpc: &R) -> RpcResult<Vec<String>> {
    rpc.request::<GetRawMempool>(&NODE, &GetRawMempoolParams { verbose: false })
        .await
}

pub async fn help<R: NodeRpc>(rpc: &R, command: Option<&str>) -> RpcResult<String> {
    let params = HelpParams {
        command: command.filter(|c| !c.is_empty()).map(str::to_string),
    };
    rpc.request::<Help>(&NODE, &params).await
}

pub async fn list_wallet_dir<R: NodeRpc>(rpc: &R) -> RpcResult<WalletDir> {
    rpc.request::<ListWalletDir>(&NODE, &NoParams {}).await
}

pub async fn list_wallets<R: NodeRpc>(rpc: &R) -> RpcResult<Vec<String>> {
    rpc.request::<ListWallets>(&NODE, &NoParams {}).await
}

pub async fn load_wallet<R: NodeRpc>(rpc: &R, name: &str) -> RpcResult<WalletLoadResult> {
    let params = LoadWalletParams {
        filename: name.to_string(),
    };
    let result = rpc.request::<LoadWallet>(&NODE, &params).await?;
    tracing::info!(wallet = name, "Wallet loaded");
    Ok(result)
}

/// Unload `name`. Nodes that answer `null` yield an empty result.
pub async fn unload_wallet<R: NodeRpc>(rpc: &R, name: &str) -> RpcResult<WalletLoadResult> {
    let params = UnloadWalletParams {
        wallet_name: name.to_string(),
    };
    let result = rpc.request::<UnloadWallet>(&NODE, &params).await?;
    tracing::info!(wallet = name, "Wallet unloaded");
    Ok(result.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::{self, ScriptedNode};
    use crate::rpc::RpcError;
    use serde_json::{json, Value};

    fn block_json(hash: &str, height: u64) -> Value {
        json!({
            "hash": hash, "confirmations": 1, "height": height, "version": 536870912,
            "versionHex": "20000000", "merkleroot": "ab".repeat(32), "time": 1700000000,
            "mediantime": 1700000000, "nonce": 0, "bits": "207fffff", "difficulty": 4.6e-10,
            "chainwork": "0000012c", "nTx": 1, "strippedsize": 250, "size": 285,
            "weight": 1035, "tx": ["cd".repeat(32)]
        })
    }

    #[tokio::test]
    async fn test_node_status_aggregates_four_calls() {
        let node = ScriptedNode::new();
        node.ok("getblockchaininfo", testing::blockchain_info())
            .ok("getmempoolinfo", testing::mempool_info())
            .ok("getmininginfo", testing::mining_info())
            .ok("getnetworkinfo", testing::network_info());

        let status = node_status(&node).await.unwrap();
        assert_eq!(status.blockchain.blocks, 150);
        assert_eq!(status.mempool.size, 2);
        assert_eq!(status.network.subversion, "/Satoshi:27.0.0/");

        let mut methods = node.methods();
        methods.sort();
        assert_eq!(
            methods,
            vec!["getblockchaininfo", "getmempoolinfo", "getmininginfo", "getnetworkinfo"]
        );
        assert!(node.calls().iter().all(|c| c.scope == WalletScope::Node));
    }

    #[tokio::test]
    async fn test_node_status_fails_when_any_section_fails() {
        let node = ScriptedNode::new();
        node.ok("getblockchaininfo", testing::blockchain_info())
            .ok("getmempoolinfo", testing::mempool_info())
            .node_error("getmininginfo", -28, "Loading block index...")
            .ok("getnetworkinfo", testing::network_info());

        let err = node_status(&node).await.unwrap_err();
        assert_eq!(
            err,
            RpcError::Node {
                code: -28,
                message: "Loading block index...".into()
            }
        );
    }

    #[tokio::test]
    async fn test_block_by_height_resolves_hash_first() {
        let hash = "11".repeat(32);
        let node = ScriptedNode::new();
        node.ok("getblockhash", json!(hash))
            .ok("getblock", block_json(&hash, 42));

        let block = block_by_height(&node, 42).await.unwrap();
        assert_eq!(block.height, 42);

        let calls = node.calls();
        assert_eq!(calls[0].params, json!({ "height": 42 }));
        assert_eq!(calls[1].params, json!({ "blockhash": hash, "verbosity": 1 }));
    }

    #[tokio::test]
    async fn test_block_by_height_stops_on_unknown_height() {
        let node = ScriptedNode::new();
        node.node_error("getblockhash", -8, "Block height out of range");

        let err = block_by_height(&node, 9_999).await.unwrap_err();
        assert!(matches!(err, RpcError::Node { code: -8, .. }));
        assert_eq!(node.methods(), vec!["getblockhash"]);
    }

    #[tokio::test]
    async fn test_help_without_command_sends_no_params() {
        let node = ScriptedNode::new();
        node.ok("help", json!("== Blockchain ==")).ok("help", json!("getblock \"blockhash\""));

        assert_eq!(help(&node, None).await.unwrap(), "== Blockchain ==");
        help(&node, Some("getblock")).await.unwrap();

        let calls = node.calls();
        assert_eq!(calls[0].params, json!({}));
        assert_eq!(calls[1].params, json!({ "command": "getblock" }));
    }

    #[tokio::test]
    async fn test_unload_wallet_null_result() {
        let node = ScriptedNode::new();
        node.ok("unloadwallet", Value::Null);

        let result = unload_wallet(&node, "hot").await.unwrap();
        assert_eq!(result, WalletLoadResult::default());
        assert_eq!(node.calls()[0].params, json!({ "wallet_name": "hot" }));
        assert_eq!(node.calls()[0].scope, WalletScope::Node);
    }

    #[tokio::test]
    async fn test_load_wallet_params() {
        let node = ScriptedNode::new();
        node.ok("loadwallet", json!({ "name": "cold", "warnings": [] }));

        let result = load_wallet(&node, "cold").await.unwrap();
        assert_eq!(result.name.as_deref(), Some("cold"));
        assert_eq!(node.calls()[0].params, json!({ "filename": "cold" }));
    }

    #[tokio::test]
    async fn test_tx_out_includes_mempool_and_maps_null() {
        let node = ScriptedNode::new();
        let parent = "d".repeat(64);
        node.ok("gettxout", testing::tx_out(0.01)).ok("gettxout", Value::Null);

        let out = tx_out(&node, &parent, 1).await.unwrap().unwrap();
        assert_eq!(out.value, bitcoin::Amount::from_sat(1_000_000));
        assert_eq!(out.confirmations, 0);
        assert!(tx_out(&node, &parent, 2).await.unwrap().is_none());

        assert_eq!(
            node.calls()[0].params,
            json!({ "txid": parent, "n": 1, "include_mempool": true })
        );
        assert_eq!(node.calls()[0].scope, WalletScope::Node);
    }
}
