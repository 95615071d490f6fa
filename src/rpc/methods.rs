//! Typed descriptions of the node RPC methods the console uses.
//!
//! Each method is a zero-sized marker implementing [`RpcMethod`], tying the
//! wire name to its parameter and response types. Parameters are sent as
//! named (object) params.

use bitcoin::Amount;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::node::model::{
    Block, BlockchainInfo, MempoolInfo, MiningInfo, NetworkInfo, RawTransaction, UnspentTxOut,
};
use crate::wallet::model::{
    AddressBalance, AddressInfo, AddressType, BumpFeeResult, DescriptorInfo, OutPoint, Outputs,
    SignedTransaction, UnspentOutput, WalletDir, WalletInfo, WalletLoadResult, WalletTransaction,
};

/// A node RPC method with typed parameters and response.
pub trait RpcMethod {
    /// Method name on the wire.
    const NAME: &'static str;
    /// Must be sent to a wallet endpoint.
    const WALLET: bool;
    type Params: Serialize;
    type Response: DeserializeOwned + Send;
}

macro_rules! rpc_method {
    (@scope node) => { false };
    (@scope wallet) => { true };
    ($(#[$doc:meta])* $marker:ident, $name:literal, $scope:ident, $params:ty => $response:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl RpcMethod for $marker {
            const NAME: &'static str = $name;
            const WALLET: bool = rpc_method!(@scope $scope);
            type Params = $params;
            type Response = $response;
        }
    };
}

/// Empty parameter object, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize)]
pub struct GetRawTransactionParams {
    pub txid: String,
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetTxOutParams {
    pub txid: String,
    pub n: u32,
    pub include_mempool: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetBlockParams {
    pub blockhash: String,
    pub verbosity: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetBlockHashParams {
    pub height: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetRawMempoolParams {
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HelpParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadWalletParams {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnloadWalletParams {
    pub wallet_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListTransactionsParams {
    pub label: String,
    pub count: u32,
    pub skip: u32,
    pub include_watchonly: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetNewAddressParams {
    pub address_type: AddressType,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendToAddressParams {
    pub address: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    /// sat/vB.
    pub fee_rate: f64,
    pub replaceable: bool,
    pub subtractfeefromamount: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRawTransactionParams {
    pub inputs: Vec<OutPoint>,
    pub outputs: Outputs,
}

#[derive(Debug, Clone, Serialize)]
pub struct HexParams {
    pub hexstring: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressParams {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptorParams {
    pub descriptor: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BumpFeeParams {
    pub txid: String,
    /// sat/vB.
    pub fee_rate: f64,
}

// Node methods.
rpc_method!(GetBlockchainInfo, "getblockchaininfo", node, NoParams => BlockchainInfo);
rpc_method!(GetMempoolInfo, "getmempoolinfo", node, NoParams => MempoolInfo);
rpc_method!(GetMiningInfo, "getmininginfo", node, NoParams => MiningInfo);
rpc_method!(GetNetworkInfo, "getnetworkinfo", node, NoParams => NetworkInfo);
rpc_method!(GetRawTransaction, "getrawtransaction", node, GetRawTransactionParams => RawTransaction);
rpc_method!(GetBlock, "getblock", node, GetBlockParams => Block);
rpc_method!(GetBlockHash, "getblockhash", node, GetBlockHashParams => String);
rpc_method!(
    /// Non-verbose form: list of txids.
    GetRawMempool, "getrawmempool", node, GetRawMempoolParams => Vec<String>
);
rpc_method!(Help, "help", node, HelpParams => String);
rpc_method!(GetTxOut, "gettxout", node, GetTxOutParams => Option<UnspentTxOut>);

// Wallet management, sent to the node endpoint.
rpc_method!(ListWalletDir, "listwalletdir", node, NoParams => WalletDir);
rpc_method!(ListWallets, "listwallets", node, NoParams => Vec<String>);
rpc_method!(LoadWallet, "loadwallet", node, LoadWalletParams => WalletLoadResult);
rpc_method!(
    /// Older nodes answer `null`.
    UnloadWallet, "unloadwallet", node, UnloadWalletParams => Option<WalletLoadResult>
);

// Wallet-scoped methods.
rpc_method!(GetWalletInfo, "getwalletinfo", wallet, NoParams => WalletInfo);
rpc_method!(GetBalance, "getbalance", wallet, NoParams => f64);
rpc_method!(ListTransactions, "listtransactions", wallet, ListTransactionsParams => Vec<WalletTransaction>);
rpc_method!(GetNewAddress, "getnewaddress", wallet, GetNewAddressParams => String);
rpc_method!(ListUnspent, "listunspent", wallet, NoParams => Vec<UnspentOutput>);
rpc_method!(GetRawChangeAddress, "getrawchangeaddress", wallet, NoParams => String);
rpc_method!(
    /// Returns the unsigned transaction hex.
    CreateRawTransaction, "createrawtransaction", wallet, CreateRawTransactionParams => String
);
rpc_method!(SignRawTransactionWithWallet, "signrawtransactionwithwallet", wallet, HexParams => SignedTransaction);
rpc_method!(
    /// Returns the txid of the accepted transaction.
    SendRawTransaction, "sendrawtransaction", wallet, HexParams => String
);
rpc_method!(SendToAddress, "sendtoaddress", wallet, SendToAddressParams => String);
rpc_method!(ListAddressGroupings, "listaddressgroupings", wallet, NoParams => Vec<Vec<AddressBalance>>);
rpc_method!(GetAddressInfo, "getaddressinfo", wallet, AddressParams => AddressInfo);
rpc_method!(GetDescriptorInfo, "getdescriptorinfo", wallet, DescriptorParams => DescriptorInfo);
rpc_method!(BumpFee, "bumpfee", wallet, BumpFeeParams => BumpFeeResult);
