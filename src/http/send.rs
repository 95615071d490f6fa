//! Send endpoints. Advanced send and CPFP each have a preview route that
//! prices the draft without touching the pipeline.
//!
//! Advanced sends and CPFP go through the shared pipeline, so only one of
//! them runs at a time. Simple sends and bumps are single node calls.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::http::error::ApiResult;
use crate::http::server::AppState;
use crate::http::wallet::wallet_scope;
use crate::wallet::forms::{AdvancedSendForm, BumpFeeForm, CpfpForm, SendForm};
use crate::wallet::model::BumpFeeResult;
use crate::wallet::preview::{self, CpfpPreview, SendPreview};
use crate::wallet::queries;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/wallet/send", post(send))
        .route("/api/wallet/send-advanced/preview", post(preview_advanced))
        .route("/api/wallet/cpfp/preview", post(preview_cpfp))
        .route("/api/wallet/bumpfee", post(bump_fee))
}

/// Routes that run the staged pipeline. They are never cut short by the
/// request timeout.
pub fn pipeline_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wallet/send-advanced", post(send_advanced))
        .route("/api/wallet/cpfp", post(cpfp))
}

#[derive(Debug, Serialize)]
pub struct TxidView {
    pub txid: String,
}

async fn send(
    State(state): State<AppState>,
    Json(form): Json<SendForm>,
) -> ApiResult<Json<TxidView>> {
    let params = form.into_params()?;
    let scope = wallet_scope(&state)?;
    let txid = queries::send_to_address(&state.client, &scope, &params).await?;
    Ok(Json(TxidView { txid }))
}

async fn preview_advanced(
    State(state): State<AppState>,
    Json(form): Json<AdvancedSendForm>,
) -> ApiResult<Json<SendPreview>> {
    let scope = wallet_scope(&state)?;
    let preview = preview::preview_advanced_send(
        &state.client,
        &scope,
        form,
        state.wallet_config.funds_policy,
    )
    .await?;
    Ok(Json(preview))
}

async fn send_advanced(
    State(state): State<AppState>,
    Json(form): Json<AdvancedSendForm>,
) -> ApiResult<Json<TxidView>> {
    let scope = wallet_scope(&state)?;
    let draft = preview::prepare_advanced_send(
        &state.client,
        &scope,
        form,
        state.wallet_config.funds_policy,
    )
    .await?;
    let txid = state.pipeline.run(&state.session, draft).await?;
    Ok(Json(TxidView { txid }))
}

async fn cpfp(
    State(state): State<AppState>,
    Json(form): Json<CpfpForm>,
) -> ApiResult<Json<TxidView>> {
    let draft = form.into_draft()?;
    let txid = state.pipeline.run(&state.session, draft).await?;
    Ok(Json(TxidView { txid }))
}

async fn preview_cpfp(
    State(state): State<AppState>,
    Json(form): Json<CpfpForm>,
) -> ApiResult<Json<CpfpPreview>> {
    Ok(Json(preview::preview_cpfp(&state.client, form).await?))
}

async fn bump_fee(
    State(state): State<AppState>,
    Json(form): Json<BumpFeeForm>,
) -> ApiResult<Json<BumpFeeResult>> {
    let params = form.into_params()?;
    let scope = wallet_scope(&state)?;
    Ok(Json(queries::bump_fee(&state.client, &scope, &params).await?))
}
