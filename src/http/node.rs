//! Node and wallet-management endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::node::model::{Block, MempoolInfo, NodeStatus, RawTransaction};
use crate::node::queries;
use crate::wallet::model::{WalletDir, WalletLoadResult};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/node/status", get(node_status))
        .route("/api/node/mempool", get(mempool))
        .route("/api/node/help", get(help))
        .route("/api/blocks/height/{height}", get(block_by_height))
        .route("/api/blocks/{hash}", get(block_by_hash))
        .route("/api/tx/{txid}", get(transaction))
        .route("/api/wallets", get(list_wallets))
        .route("/api/wallets/dir", get(list_wallet_dir))
        .route("/api/wallets/{name}/load", post(load_wallet))
        .route("/api/wallets/{name}/unload", post(unload_wallet))
}

async fn node_status(State(state): State<AppState>) -> ApiResult<Json<NodeStatus>> {
    Ok(Json(queries::node_status(&state.client).await?))
}

#[derive(Debug, Serialize)]
pub struct MempoolView {
    pub info: MempoolInfo,
    pub txids: Vec<String>,
}

async fn mempool(State(state): State<AppState>) -> ApiResult<Json<MempoolView>> {
    let (info, txids) = tokio::try_join!(
        queries::mempool_info(&state.client),
        queries::raw_mempool(&state.client),
    )?;
    Ok(Json(MempoolView { info, txids }))
}

#[derive(Debug, Deserialize)]
pub struct HelpQuery {
    pub command: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HelpText {
    pub command: Option<String>,
    pub text: String,
}

async fn help(
    State(state): State<AppState>,
    Query(query): Query<HelpQuery>,
) -> ApiResult<Json<HelpText>> {
    let text = queries::help(&state.client, query.command.as_deref()).await?;
    Ok(Json(HelpText {
        command: query.command,
        text,
    }))
}

async fn block_by_height(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> ApiResult<Json<Block>> {
    Ok(Json(queries::block_by_height(&state.client, height).await?))
}

async fn block_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<Json<Block>> {
    require_hex_id("block hash", &hash)?;
    Ok(Json(queries::block_by_hash(&state.client, &hash).await?))
}

async fn transaction(
    State(state): State<AppState>,
    Path(txid): Path<String>,
) -> ApiResult<Json<RawTransaction>> {
    require_hex_id("txid", &txid)?;
    Ok(Json(queries::raw_transaction(&state.client, &txid).await?))
}

async fn list_wallets(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(queries::list_wallets(&state.client).await?))
}

async fn list_wallet_dir(State(state): State<AppState>) -> ApiResult<Json<WalletDir>> {
    Ok(Json(queries::list_wallet_dir(&state.client).await?))
}

async fn load_wallet(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<WalletLoadResult>> {
    Ok(Json(queries::load_wallet(&state.client, &name).await?))
}

async fn unload_wallet(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<WalletLoadResult>> {
    let result = queries::unload_wallet(&state.client, &name).await?;
    if state.session.current_wallet().as_deref() == Some(name.as_str()) {
        state.session.clear();
    }
    Ok(Json(result))
}

/// Explorer lookups take 64-hex ids; anything else never reaches the node.
fn require_hex_id(what: &str, value: &str) -> Result<(), ApiError> {
    if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("{} must be 64 hex characters", what)))
    }
}
