//! Wire types, wallet scoping and error definitions for node RPC.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// JSON-RPC protocol version sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Which endpoint of the node a call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WalletScope {
    /// Node base URL, no wallet path.
    Node,
    /// The default (unnamed) wallet, `/wallet/`.
    DefaultWallet,
    /// A named wallet, `/wallet/<name>`.
    Named(String),
}

impl WalletScope {
    /// Map an optional wallet name onto a scope.
    ///
    /// `None` targets the node itself, `Some("")` the default wallet path.
    pub fn from_wallet(wallet: Option<&str>) -> Self {
        match wallet {
            None => Self::Node,
            Some("") => Self::DefaultWallet,
            Some(name) => Self::Named(name.to_string()),
        }
    }

    /// Whether this scope addresses a wallet endpoint.
    pub fn is_wallet(&self) -> bool {
        !matches!(self, Self::Node)
    }

    /// Wallet name for logging; `None` for node scope.
    pub fn wallet_name(&self) -> Option<&str> {
        match self {
            Self::Node => None,
            Self::DefaultWallet => Some(""),
            Self::Named(name) => Some(name),
        }
    }
}

/// Outgoing JSON-RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    /// Build a request with a fresh id.
    pub fn new(method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        }
    }
}

/// Error object reported by the node inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeErrorObject {
    pub code: i64,
    pub message: String,
}

/// Response envelope: exactly one of `result`/`error` is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEnvelope<T = Value> {
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<NodeErrorObject>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
}

impl RpcEnvelope<Value> {
    /// Convert into the typed result, turning an `error` object into
    /// [`RpcError::Node`].
    ///
    /// A missing or null `result` is decoded from `null`, so methods that
    /// return nothing can use `()` or `Option<_>` as their response type.
    pub fn into_result<T: DeserializeOwned>(self) -> RpcResult<T> {
        if let Some(err) = self.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        serde_json::from_value(self.result.unwrap_or(Value::Null))
            .map_err(|e| RpcError::Decode(format!("unexpected result shape: {}", e)))
    }

    /// Whether the node reported an error for this call.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// Errors that can occur during node RPC operations.
///
/// `Transport`, `Timeout`, `Http` and `Decode` mean the call never produced a
/// usable envelope. `Node` means the node answered and rejected the call.
/// `InvalidRequest` means the call was refused before reaching the network.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RpcError {
    /// Connection, DNS or I/O failure.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// RPC request exceeded its deadline.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Non-success HTTP status without a JSON-RPC envelope (e.g. bad credentials).
    #[error("RPC endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body was not a valid envelope or result.
    #[error("RPC decode error: {0}")]
    Decode(String),

    /// The node reported a method-specific error.
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    /// Request refused locally.
    #[error("invalid RPC request: {0}")]
    InvalidRequest(String),
}

impl RpcError {
    /// True for failures where the request did not complete.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::Http { .. } | Self::Decode(_)
        )
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Http { .. } => "http",
            Self::Decode(_) => "decode",
            Self::Node { .. } => "node",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
