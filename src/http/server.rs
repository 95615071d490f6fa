//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics, response headers)
//! - Bind server to listener
//! - Shut down gracefully on signal

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ConsoleConfig, WalletConfig};
use crate::http::middleware::{request_span, track_metrics};
use crate::http::{node, send, wallet};
use crate::rpc::{NodeClient, RpcResult};
use crate::wallet::{AdvancedSendPipeline, WalletSession};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: NodeClient,
    pub session: Arc<WalletSession>,
    pub pipeline: Arc<AdvancedSendPipeline<NodeClient>>,
    pub wallet_config: Arc<WalletConfig>,
}

impl AppState {
    /// Build state from configuration. Makes no node calls.
    pub fn from_config(config: &ConsoleConfig) -> RpcResult<Self> {
        let client = NodeClient::new(config.node.clone())?;
        let session = WalletSession::with_wallet(config.wallet.default_wallet.clone());
        if let Some(wallet) = session.current_wallet() {
            tracing::info!(wallet = %wallet, "Initial wallet selected");
        }
        Ok(Self {
            pipeline: Arc::new(AdvancedSendPipeline::new(client.clone())),
            client,
            session: Arc::new(session),
            wallet_config: Arc::new(config.wallet.clone()),
        })
    }
}

/// HTTP server for the dashboard API.
pub struct HttpServer {
    router: Router,
    config: ConsoleConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ConsoleConfig) -> RpcResult<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around existing state.
    pub fn with_state(config: ConsoleConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Pipeline routes sit outside the request timeout: dropping a send
    /// after broadcast would hide whether the node accepted it. Each node
    /// call there is bounded by the RPC deadline instead.
    #[allow(deprecated)]
    fn build_router(config: &ConsoleConfig, state: AppState) -> Router {
        let bounded = Router::new()
            .merge(node::routes())
            .merge(wallet::routes())
            .merge(send::routes())
            .route("/health", get(health))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .merge(bounded)
            .merge(send::pipeline_routes())
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // Balances and addresses must not linger in caches.
                    .layer(SetResponseHeaderLayer::overriding(
                        header::CACHE_CONTROL,
                        HeaderValue::from_static("no-store"),
                    ))
                    .layer(SetResponseHeaderLayer::overriding(
                        header::X_CONTENT_TYPE_OPTIONS,
                        HeaderValue::from_static("nosniff"),
                    ))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            node_url = %self.config.node.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness of the console itself; does not call the node.
async fn health() -> Json<HealthView> {
    Json(HealthView {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
