//! API error type and its JSON rendering.
//!
//! # Status mapping
//! - transport failure → 502, deadline → 504
//! - node rejection → 422 with the node's code and message verbatim
//! - incomplete signature → 422
//! - no wallet selected, send in flight → 409
//! - invalid input → 400

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::rpc::RpcError;
use crate::wallet::forms::{FieldError, ValidationErrors};
use crate::wallet::model::SigningError;
use crate::wallet::pipeline::{PipelineError, Stage};
use crate::wallet::preview::PrepareError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("no wallet selected")]
    NoWalletSelected,

    #[error("{0}")]
    BadRequest(String),
}

impl From<PrepareError> for ApiError {
    fn from(err: PrepareError) -> Self {
        match err {
            PrepareError::Rpc(e) => ApiError::Rpc(e),
            PrepareError::Invalid(e) => ApiError::Invalid(e),
        }
    }
}

/// `{"error": {...}}` body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// `transport`, `timeout`, `node`, `incomplete_signature`, `no_wallet`,
    /// `in_flight`, `invalid`.
    pub class: &'static str,
    pub message: String,
    /// Node error code, for node rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signing_errors: Vec<SigningError>,
}

impl ErrorDetail {
    fn new(class: &'static str, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            code: None,
            stage: None,
            fields: Vec::new(),
            signing_errors: Vec::new(),
        }
    }
}

fn rpc_detail(err: &RpcError) -> (StatusCode, ErrorDetail) {
    match err {
        RpcError::Node { code, message } => {
            let mut detail = ErrorDetail::new("node", message.clone());
            detail.code = Some(*code);
            (StatusCode::UNPROCESSABLE_ENTITY, detail)
        }
        RpcError::Timeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            ErrorDetail::new("timeout", err.to_string()),
        ),
        RpcError::InvalidRequest(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("invalid", err.to_string()),
        ),
        RpcError::Transport(_) | RpcError::Http { .. } | RpcError::Decode(_) => (
            StatusCode::BAD_GATEWAY,
            ErrorDetail::new("transport", err.to_string()),
        ),
    }
}

impl ApiError {
    pub fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            ApiError::Rpc(e) => rpc_detail(e),
            ApiError::Pipeline(e) => match e {
                PipelineError::NoWalletSelected => {
                    (StatusCode::CONFLICT, ErrorDetail::new("no_wallet", e.to_string()))
                }
                PipelineError::InFlight => {
                    (StatusCode::CONFLICT, ErrorDetail::new("in_flight", e.to_string()))
                }
                PipelineError::Transport { stage, source } => {
                    let (status, mut detail) = rpc_detail(source);
                    detail.message = e.to_string();
                    detail.stage = Some(*stage);
                    (status, detail)
                }
                PipelineError::Rejected {
                    stage,
                    code,
                    message,
                } => {
                    let mut detail = ErrorDetail::new("node", message.clone());
                    detail.code = Some(*code);
                    detail.stage = Some(*stage);
                    (StatusCode::UNPROCESSABLE_ENTITY, detail)
                }
                PipelineError::IncompleteSignature { errors } => {
                    let mut detail = ErrorDetail::new("incomplete_signature", e.to_string());
                    detail.stage = Some(Stage::Sign);
                    detail.signing_errors = errors.clone();
                    (StatusCode::UNPROCESSABLE_ENTITY, detail)
                }
            },
            ApiError::Invalid(errors) => {
                let mut detail = ErrorDetail::new("invalid", errors.to_string());
                detail.fields = errors.errors().to_vec();
                (StatusCode::BAD_REQUEST, detail)
            }
            ApiError::NoWalletSelected => (
                StatusCode::CONFLICT,
                ErrorDetail::new("no_wallet", self.to_string()),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorDetail::new("invalid", message.clone()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_detail();
        if status.is_server_error() {
            tracing::warn!(status = %status, class = error.class, message = %error.message, "API request failed");
        } else {
            tracing::debug!(status = %status, class = error.class, message = %error.message, "API request rejected");
        }
        (status, Json(ErrorBody { error })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
