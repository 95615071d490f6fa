//! Advanced send: build → sign → broadcast as one action.
//!
//! # Data Flow
//! ```text
//! TransactionDraft (validated upstream)
//!     → session.scope()            none selected → NoWalletSelected, no calls
//!     → in-flight guard            busy → InFlight, no calls
//!     → createrawtransaction       → unsigned hex
//!     → signrawtransactionwithwallet
//!         complete == false        → IncompleteSignature
//!     → sendrawtransaction         → txid
//! ```
//!
//! # Design Decisions
//! - No stage runs after a failing one; the failure names its stage
//! - Node rejections keep the node's code and message verbatim
//! - Funds are not checked here; the node (or the funds policy) decides
//! - Runs are never deduplicated: resubmitting issues fresh calls

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use thiserror::Error;

use crate::observability::metrics;
use crate::rpc::methods::{
    CreateRawTransaction, CreateRawTransactionParams, HexParams, SendRawTransaction,
    SignRawTransactionWithWallet,
};
use crate::rpc::{NodeRpc, RpcError, RpcResult};
use crate::wallet::model::{SigningError, TransactionDraft};
use crate::wallet::session::WalletSession;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Build,
    Sign,
    Broadcast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Build => "build",
            Stage::Sign => "sign",
            Stage::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a send did not produce a txid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("no wallet selected")]
    NoWalletSelected,

    #[error("a send is already in progress")]
    InFlight,

    /// The call never completed (connection, timeout, bad response).
    #[error("{stage} failed: {source}")]
    Transport { stage: Stage, source: RpcError },

    /// The node answered with an error.
    #[error("{stage} failed: {message}")]
    Rejected {
        stage: Stage,
        code: i64,
        message: String,
    },

    /// Signing returned without error but not every input is signed.
    #[error("sign failed: signature incomplete ({} input errors)", .errors.len())]
    IncompleteSignature { errors: Vec<SigningError> },
}

impl PipelineError {
    /// Stage that failed, if any ran.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NoWalletSelected | Self::InFlight => None,
            Self::Transport { stage, .. } | Self::Rejected { stage, .. } => Some(*stage),
            Self::IncompleteSignature { .. } => Some(Stage::Sign),
        }
    }

    /// Failure class label.
    pub fn class(&self) -> &'static str {
        match self {
            Self::NoWalletSelected => "no_wallet",
            Self::InFlight => "in_flight",
            Self::Transport { .. } => "transport",
            Self::Rejected { .. } => "rejected",
            Self::IncompleteSignature { .. } => "incomplete_signature",
        }
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        metrics::set_pipeline_in_flight(true);
        Some(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        metrics::set_pipeline_in_flight(false);
    }
}

/// Runs advanced sends against one node, one at a time.
pub struct AdvancedSendPipeline<R> {
    rpc: R,
    in_flight: AtomicBool,
}

impl<R: NodeRpc> AdvancedSendPipeline<R> {
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build, sign and broadcast `draft` from the session's wallet.
    ///
    /// Returns the txid exactly as the node reported it.
    pub async fn run(
        &self,
        session: &WalletSession,
        draft: TransactionDraft,
    ) -> Result<String, PipelineError> {
        let scope = session.scope().ok_or(PipelineError::NoWalletSelected)?;
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            tracing::warn!(wallet = ?scope.wallet_name(), "Send rejected: another send in progress");
            PipelineError::InFlight
        })?;

        tracing::info!(
            wallet = ?scope.wallet_name(),
            inputs = draft.inputs.len(),
            outputs = draft.outputs.len(),
            "Advanced send started"
        );

        let params = CreateRawTransactionParams {
            inputs: draft.inputs,
            outputs: draft.outputs,
        };
        let unsigned = stage(
            Stage::Build,
            self.rpc.request::<CreateRawTransaction>(&scope, &params),
        )
        .await?;

        let signed = stage(
            Stage::Sign,
            self.rpc.request::<SignRawTransactionWithWallet>(
                &scope,
                &HexParams { hexstring: unsigned },
            ),
        )
        .await?;
        if !signed.complete {
            tracing::warn!(
                wallet = ?scope.wallet_name(),
                stage = %Stage::Sign,
                input_errors = signed.errors.len(),
                "Signature incomplete"
            );
            metrics::record_pipeline_stage(Stage::Sign.as_str(), "incomplete");
            return Err(PipelineError::IncompleteSignature {
                errors: signed.errors,
            });
        }

        let txid = stage(
            Stage::Broadcast,
            self.rpc.request::<SendRawTransaction>(
                &scope,
                &HexParams {
                    hexstring: signed.hex,
                },
            ),
        )
        .await?;

        tracing::info!(wallet = ?scope.wallet_name(), txid = %txid, "Transaction broadcast");
        Ok(txid)
    }
}

async fn stage<T>(
    stage: Stage,
    call: impl Future<Output = RpcResult<T>>,
) -> Result<T, PipelineError> {
    match call.await {
        Ok(value) => {
            metrics::record_pipeline_stage(stage.as_str(), "ok");
            Ok(value)
        }
        Err(RpcError::Node { code, message }) => {
            tracing::warn!(stage = %stage, code = code, message = %message, "Node rejected send");
            metrics::record_pipeline_stage(stage.as_str(), "rejected");
            Err(PipelineError::Rejected {
                stage,
                code,
                message,
            })
        }
        Err(source) => {
            tracing::warn!(stage = %stage, error = %source, "Send stage failed");
            metrics::record_pipeline_stage(stage.as_str(), "transport");
            Err(PipelineError::Transport { stage, source })
        }
    }
}
