//! Bitcoin node console.
//!
//! A dashboard API and wallet console over a Bitcoin node's JSON-RPC.
//!
//! # Architecture Overview
//!
//! ```text
//!   API client ──▶ http (axum) ──┬──▶ node::queries ─────────────┐
//!                                │                               │
//!                                ├──▶ wallet::queries ───────────┤
//!                                │      (scope from session)     │
//!                                │                               ▼
//!                                ├──▶ wallet::preview ────▶ rpc::NodeClient ──▶ node
//!                                │                               ▲     (JSON-RPC, Basic auth,
//!                                └──▶ wallet::pipeline ──────────┘      /wallet/<name>)
//!                                       build → sign → broadcast
//!
//!   Cross-cutting: config, observability (tracing, metrics),
//!                  resilience (deadlines), lifecycle (startup, shutdown)
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod node;
pub mod rpc;
pub mod wallet;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ConsoleConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rpc::{NodeClient, NodeRpc, RpcError, WalletScope};
pub use wallet::{AdvancedSendPipeline, PipelineError, WalletSession};
