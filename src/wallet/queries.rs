//! Typed wallet queries and single-call wallet actions.
//!
//! Every function takes the scope explicitly; callers read it from the
//! [`WalletSession`](crate::wallet::session::WalletSession) at call time.

use bitcoin::Amount;

use crate::rpc::methods::{
    AddressParams, BumpFee, BumpFeeParams, DescriptorParams, GetAddressInfo, GetBalance,
    GetDescriptorInfo, GetNewAddress, GetNewAddressParams, GetRawChangeAddress, GetWalletInfo,
    ListAddressGroupings, ListTransactions, ListTransactionsParams, ListUnspent, NoParams,
    SendToAddress, SendToAddressParams,
};
use crate::rpc::{NodeRpc, RpcError, RpcResult, WalletScope};
use crate::wallet::model::{
    AddressBalance, AddressInfo, AddressType, BumpFeeResult, DescriptorInfo, HistoryEntry,
    TransactionPage, UnspentOutput, WalletInfo,
};

pub async fn wallet_info<R: NodeRpc>(rpc: &R, scope: &WalletScope) -> RpcResult<WalletInfo> {
    rpc.request::<GetWalletInfo>(scope, &NoParams {}).await
}

/// Trusted balance.
pub async fn balance<R: NodeRpc>(rpc: &R, scope: &WalletScope) -> RpcResult<Amount> {
    let btc = rpc.request::<GetBalance>(scope, &NoParams {}).await?;
    Amount::from_btc(btc).map_err(|e| RpcError::Decode(format!("invalid balance {}: {}", btc, e)))
}

/// One page of history, newest first. `page` counts from zero.
pub async fn list_transactions<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    page: u32,
    page_size: u32,
) -> RpcResult<TransactionPage> {
    let params = ListTransactionsParams {
        label: "*".to_string(),
        count: page_size,
        skip: page.saturating_mul(page_size),
        include_watchonly: true,
    };
    let listed = rpc.request::<ListTransactions>(scope, &params).await?;
    let has_more = listed.len() as u32 >= page_size;
    // The node returns the window oldest first.
    let items = listed.into_iter().rev().map(HistoryEntry::from).collect();
    Ok(TransactionPage {
        page,
        page_size,
        items,
        has_more,
    })
}

pub async fn list_unspent<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
) -> RpcResult<Vec<UnspentOutput>> {
    rpc.request::<ListUnspent>(scope, &NoParams {}).await
}

pub async fn new_address<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    address_type: AddressType,
) -> RpcResult<String> {
    rpc.request::<GetNewAddress>(scope, &GetNewAddressParams { address_type })
        .await
}

pub async fn raw_change_address<R: NodeRpc>(rpc: &R, scope: &WalletScope) -> RpcResult<String> {
    rpc.request::<GetRawChangeAddress>(scope, &NoParams {}).await
}

pub async fn address_groupings<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
) -> RpcResult<Vec<Vec<AddressBalance>>> {
    rpc.request::<ListAddressGroupings>(scope, &NoParams {}).await
}

pub async fn address_info<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    address: &str,
) -> RpcResult<AddressInfo> {
    let params = AddressParams {
        address: address.to_string(),
    };
    rpc.request::<GetAddressInfo>(scope, &params).await
}

pub async fn descriptor_info<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    descriptor: &str,
) -> RpcResult<DescriptorInfo> {
    let params = DescriptorParams {
        descriptor: descriptor.to_string(),
    };
    rpc.request::<GetDescriptorInfo>(scope, &params).await
}

/// Wallet-funded send. Returns the txid.
pub async fn send_to_address<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    params: &SendToAddressParams,
) -> RpcResult<String> {
    let txid = rpc.request::<SendToAddress>(scope, params).await?;
    tracing::info!(wallet = ?scope.wallet_name(), txid = %txid, amount = %params.amount, "Sent to address");
    Ok(txid)
}

/// Replace-by-fee.
pub async fn bump_fee<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    params: &BumpFeeParams,
) -> RpcResult<BumpFeeResult> {
    let result = rpc.request::<BumpFee>(scope, params).await?;
    tracing::info!(
        wallet = ?scope.wallet_name(),
        original = %params.txid,
        replacement = %result.txid,
        "Fee bumped"
    );
    Ok(result)
}
