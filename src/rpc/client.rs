//! Node JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - POST JSON-RPC 2.0 requests to the node (Basic auth)
//! - Route wallet-scoped calls to `/wallet/<name>`
//! - Enforce a deadline on every call
//! - Keep transport failures apart from node-reported errors

use std::future::Future;
use std::time::{Duration, Instant};

use serde_json::Value;
use url::Url;

use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::rpc::methods::RpcMethod;
use crate::rpc::types::{NodeConfig, RpcEnvelope, RpcError, RpcRequest, RpcResult, WalletScope};

/// Anything that can carry a JSON-RPC call to a node.
///
/// `call_raw` is the single network seam: exactly one request per call, an
/// envelope on any completed exchange, `Err` only when the exchange failed.
pub trait NodeRpc: Send + Sync {
    /// Issue `method` with `params` against the endpoint selected by `scope`.
    fn call_raw(
        &self,
        method: &str,
        params: Value,
        scope: &WalletScope,
    ) -> impl Future<Output = RpcResult<RpcEnvelope>> + Send;

    /// Typed call: serializes params, checks scoping, decodes the result.
    ///
    /// A wallet-scoped method issued against [`WalletScope::Node`] is refused
    /// without touching the network.
    fn request<M: RpcMethod>(
        &self,
        scope: &WalletScope,
        params: &M::Params,
    ) -> impl Future<Output = RpcResult<M::Response>> + Send {
        let prepared = if M::WALLET && !scope.is_wallet() {
            Err(RpcError::InvalidRequest(format!(
                "{} requires a wallet",
                M::NAME
            )))
        } else {
            serde_json::to_value(params)
                .map_err(|e| RpcError::InvalidRequest(format!("cannot encode params: {}", e)))
        };

        async move {
            let params = prepared?;
            self.call_raw(M::NAME, params, scope).await?.into_result()
        }
    }
}

/// JSON-RPC client for a Bitcoin node.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: Url,
    config: NodeConfig,
    timeout_duration: Duration,
}

impl NodeClient {
    /// Create a new node client.
    ///
    /// No request is made here; an unreachable node surfaces on first call.
    pub fn new(config: NodeConfig) -> RpcResult<Self> {
        let base_url: Url = config.url.parse().map_err(|e| {
            RpcError::InvalidRequest(format!("Invalid node URL '{}': {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RpcError::InvalidRequest(format!(
                "Node URL '{}' cannot carry a wallet path",
                config.url
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RpcError::Transport(format!("cannot build HTTP client: {}", e)))?;

        tracing::info!(
            node_url = %base_url,
            timeout_secs = config.rpc_timeout_secs,
            "Node client initialized"
        );

        Ok(Self {
            http,
            base_url,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Endpoint URL for a scope.
    pub fn endpoint(&self, scope: &WalletScope) -> Url {
        endpoint_for(&self.base_url, scope)
    }

    /// Get the configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    async fn send(&self, url: Url, request: &RpcRequest<'_>) -> RpcResult<RpcEnvelope> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.rpc_user, Some(&self.config.rpc_password))
            .json(request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        // The node answers RPC errors with HTTP 500 and a full envelope.
        match (status.is_success(), serde_json::from_str::<RpcEnvelope>(&body)) {
            (_, Ok(envelope)) if envelope.is_error() => Ok(envelope),
            (true, Ok(envelope)) => Ok(envelope),
            (true, Err(e)) => Err(RpcError::Decode(format!("invalid JSON-RPC response: {}", e))),
            (false, _) => Err(RpcError::Http {
                status: status.as_u16(),
                body: truncate(&body, 256),
            }),
        }
    }
}

impl NodeRpc for NodeClient {
    async fn call_raw(
        &self,
        method: &str,
        params: Value,
        scope: &WalletScope,
    ) -> RpcResult<RpcEnvelope> {
        let start = Instant::now();
        let url = self.endpoint(scope);
        let request = RpcRequest::new(method, params);

        tracing::debug!(
            method = method,
            wallet = ?scope.wallet_name(),
            request_id = %request.id,
            "Calling node"
        );

        let result = with_deadline(self.timeout_duration, self.send(url, &request)).await;

        match &result {
            Ok(envelope) => match &envelope.error {
                Some(err) => {
                    tracing::debug!(method = method, code = err.code, message = %err.message, "Node rejected call");
                    metrics::record_rpc_call(method, "node_error", start);
                }
                None => metrics::record_rpc_call(method, "ok", start),
            },
            Err(e) => {
                tracing::warn!(method = method, error = %e, "RPC call failed");
                metrics::record_rpc_call(method, e.kind(), start);
            }
        }

        result
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("url", &self.config.url)
            .field("rpc_user", &self.config.rpc_user)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// Resolve the URL a scope targets under `base`.
pub fn endpoint_for(base: &Url, scope: &WalletScope) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        match scope {
            WalletScope::Node => {}
            WalletScope::DefaultWallet => {
                segments.pop_if_empty().push("wallet").push("");
            }
            WalletScope::Named(name) => {
                segments.pop_if_empty().push("wallet").push(name);
            }
        }
    }
    url
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
