//! Session and wallet read endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};

use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::rpc::WalletScope;
use crate::wallet::model::{
    AddressBalance, AddressInfo, AddressType, DescriptorInfo, TransactionPage, UnspentOutput,
    WalletInfo,
};
use crate::wallet::queries;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(get_session).put(put_session))
        .route("/api/wallet/info", get(wallet_info))
        .route("/api/wallet/balance", get(balance))
        .route("/api/wallet/transactions", get(transactions))
        .route("/api/wallet/unspent", get(unspent))
        .route("/api/wallet/addresses", post(new_address))
        .route("/api/wallet/change-address", get(change_address))
        .route("/api/wallet/addresses/groupings", get(address_groupings))
        .route("/api/wallet/addresses/{address}", get(address_info))
        .route("/api/wallet/descriptors", get(descriptor_info))
}

/// Scope of the selected wallet, read now.
pub(crate) fn wallet_scope(state: &AppState) -> Result<WalletScope, ApiError> {
    state.session.scope().ok_or(ApiError::NoWalletSelected)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// `null` clears the selection; `""` selects the default wallet.
    pub wallet: Option<String>,
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView {
        wallet: state.session.current_wallet(),
    })
}

async fn put_session(
    State(state): State<AppState>,
    Json(body): Json<SessionView>,
) -> Json<SessionView> {
    match body.wallet {
        Some(name) => state.session.set_current_wallet(name),
        None => state.session.clear(),
    }
    Json(SessionView {
        wallet: state.session.current_wallet(),
    })
}

async fn wallet_info(State(state): State<AppState>) -> ApiResult<Json<WalletInfo>> {
    let scope = wallet_scope(&state)?;
    Ok(Json(queries::wallet_info(&state.client, &scope).await?))
}

#[derive(Debug, Serialize)]
pub struct BalanceView {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub balance: Amount,
}

async fn balance(State(state): State<AppState>) -> ApiResult<Json<BalanceView>> {
    let scope = wallet_scope(&state)?;
    let balance = queries::balance(&state.client, &scope).await?;
    Ok(Json(BalanceView { balance }))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
}

async fn transactions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TransactionPage>> {
    let scope = wallet_scope(&state)?;
    let page_size = query
        .page_size
        .unwrap_or(state.wallet_config.history_page_size);
    if page_size == 0 {
        return Err(ApiError::BadRequest("page_size must be greater than zero".into()));
    }
    let page = queries::list_transactions(&state.client, &scope, query.page, page_size).await?;
    Ok(Json(page))
}

async fn unspent(State(state): State<AppState>) -> ApiResult<Json<Vec<UnspentOutput>>> {
    let scope = wallet_scope(&state)?;
    Ok(Json(queries::list_unspent(&state.client, &scope).await?))
}

#[derive(Debug, Deserialize)]
pub struct NewAddressRequest {
    pub address_type: String,
}

#[derive(Debug, Serialize)]
pub struct AddressView {
    pub address: String,
}

async fn new_address(
    State(state): State<AppState>,
    Json(body): Json<NewAddressRequest>,
) -> ApiResult<Json<AddressView>> {
    let address_type: AddressType = body.address_type.parse().map_err(ApiError::BadRequest)?;
    let scope = wallet_scope(&state)?;
    let address = queries::new_address(&state.client, &scope, address_type).await?;
    Ok(Json(AddressView { address }))
}

async fn change_address(State(state): State<AppState>) -> ApiResult<Json<AddressView>> {
    let scope = wallet_scope(&state)?;
    let address = queries::raw_change_address(&state.client, &scope).await?;
    Ok(Json(AddressView { address }))
}

async fn address_groupings(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Vec<AddressBalance>>>> {
    let scope = wallet_scope(&state)?;
    Ok(Json(queries::address_groupings(&state.client, &scope).await?))
}

async fn address_info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<AddressInfo>> {
    let scope = wallet_scope(&state)?;
    Ok(Json(queries::address_info(&state.client, &scope, &address).await?))
}

#[derive(Debug, Deserialize)]
pub struct DescriptorQuery {
    pub descriptor: String,
}

async fn descriptor_info(
    State(state): State<AppState>,
    Query(query): Query<DescriptorQuery>,
) -> ApiResult<Json<DescriptorInfo>> {
    if query.descriptor.trim().is_empty() {
        return Err(ApiError::BadRequest("descriptor is required".into()));
    }
    let scope = wallet_scope(&state)?;
    Ok(Json(
        queries::descriptor_info(&state.client, &scope, &query.descriptor).await?,
    ))
}
