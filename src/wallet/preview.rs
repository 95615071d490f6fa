//! Preparing advanced sends and CPFP children: change address fill-in,
//! input resolution, implied fee and the funds policy.

use bitcoin::{Amount, SignedAmount};
use serde::Serialize;
use thiserror::Error;

use crate::config::FundsPolicy;
use crate::rpc::{NodeRpc, RpcError, WalletScope};
use crate::node::queries as node_queries;
use crate::wallet::forms::{
    check_funds, implied_fee, AdvancedSendForm, CpfpForm, ValidationErrors,
};
use crate::wallet::model::{OutPoint, TransactionDraft, UnspentOutput};
use crate::wallet::queries;
use crate::wallet::selection::UtxoSelection;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("invalid send: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// What an advanced send would do, shown before confirming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendPreview {
    pub draft: TransactionDraft,
    /// Selected outputs found in the current unspent listing.
    pub inputs: Vec<UnspentOutput>,
    /// Selected outpoints no longer unspent.
    pub missing: Vec<OutPoint>,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub selected_total: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub outputs_total: Amount,
    /// Suggested or submitted change address.
    pub change_address: Option<String>,
    /// `selected − outputs`. Negative means the inputs do not cover the send.
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub fee: SignedAmount,
}

/// Validate `form` and compute its preview against the wallet's current
/// unspent outputs.
///
/// When a change amount is given without an address, one is fetched from
/// `getrawchangeaddress`, but only once the rest of the form is valid.
pub async fn preview_advanced_send<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    mut form: AdvancedSendForm,
    policy: FundsPolicy,
) -> Result<SendPreview, PrepareError> {
    let wants_change = form.change_amount.is_some_and(|btc| btc > 0.0);
    let has_address = form
        .change_address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty());
    if wants_change && !has_address {
        let mut without_change = form.clone();
        without_change.change_amount = None;
        without_change.into_draft()?;
        form.change_address = Some(queries::raw_change_address(rpc, scope).await?);
    }
    let change_address = form.change_address.clone();

    let draft = form.into_draft()?;
    let utxos = queries::list_unspent(rpc, scope).await?;

    let mut selection: UtxoSelection = draft.inputs.iter().cloned().collect();
    let missing = selection.resolve(&utxos);
    let selected_total = selection.total(&utxos).ok_or_else(overflow)?;
    let outputs_total = draft.outputs.total().ok_or_else(overflow)?;
    let fee = implied_fee(selected_total, outputs_total).ok_or_else(overflow)?;

    check_funds(policy, selected_total, &draft)?;

    let inputs = utxos
        .into_iter()
        .filter(|utxo| selection.contains(&utxo.outpoint()))
        .collect();

    Ok(SendPreview {
        draft,
        inputs,
        missing,
        selected_total,
        outputs_total,
        change_address,
        fee,
    })
}

/// Validate `form` into a draft ready for the pipeline.
///
/// Under [`FundsPolicy::RequireCoverage`] the inputs are priced against
/// `listunspent` first; under [`FundsPolicy::Node`] no call is made.
pub async fn prepare_advanced_send<R: NodeRpc>(
    rpc: &R,
    scope: &WalletScope,
    form: AdvancedSendForm,
    policy: FundsPolicy,
) -> Result<TransactionDraft, PrepareError> {
    let draft = form.into_draft()?;
    if policy == FundsPolicy::RequireCoverage {
        let utxos = queries::list_unspent(rpc, scope).await?;
        let selection: UtxoSelection = draft.inputs.iter().cloned().collect();
        let selected_total = selection.total(&utxos).ok_or_else(overflow)?;
        check_funds(policy, selected_total, &draft)?;
    }
    Ok(draft)
}

/// What a CPFP child would do: the parent output it spends and the fee it
/// leaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpfpPreview {
    pub draft: TransactionDraft,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub parent_value: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub child_value: Amount,
    /// `parent − child`. Negative means the child overspends the output.
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub fee: SignedAmount,
}

/// Validate `form` and price the child against the parent output, read with
/// `gettxout` so unconfirmed parents are found.
pub async fn preview_cpfp<R: NodeRpc>(rpc: &R, form: CpfpForm) -> Result<CpfpPreview, PrepareError> {
    let draft = form.into_draft()?;
    let parent = draft
        .inputs
        .first()
        .cloned()
        .ok_or_else(|| ValidationErrors::single("txid", "Transaction id is required"))?;

    let output = node_queries::tx_out(rpc, &parent.txid, parent.vout)
        .await?
        .ok_or_else(|| {
            ValidationErrors::single("vout", format!("Output {} is spent or unknown", parent))
        })?;

    let child_value = draft.outputs.total().ok_or_else(overflow)?;
    let fee = implied_fee(output.value, child_value).ok_or_else(overflow)?;

    Ok(CpfpPreview {
        draft,
        parent_value: output.value,
        child_value,
        fee,
    })
}

fn overflow() -> RpcError {
    RpcError::Decode("amount overflow".to_string())
}
