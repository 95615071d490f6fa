//! Bitcoin node JSON-RPC subsystem.
//!
//! # Data Flow
//! ```text
//! query / pipeline stage
//!     → NodeRpc::request::<M>(scope, params)   (methods.rs: typed marker)
//!     → scope check (wallet method needs a wallet)
//!     → NodeRpc::call_raw                      (client.rs)
//!         → endpoint: base | base/wallet/ | base/wallet/<name>
//!         → POST {jsonrpc, id, method, params}, Basic auth, deadline
//!     → RpcEnvelope                            (types.rs)
//!     → into_result: result | RpcError::Node
//! ```
//!
//! # Design Decisions
//! - One HTTP request per call; no retries, no caching
//! - Transport failures are `Err`; node-reported errors travel inside the
//!   envelope until the typed layer turns them into `RpcError::Node`
//! - `NodeRpc` is the seam tests replace with a scripted node

pub mod client;
pub mod methods;
pub mod types;

pub use client::{NodeClient, NodeRpc};
pub use methods::RpcMethod;
pub use types::{RpcEnvelope, RpcError, RpcResult, WalletScope};

#[cfg(test)]
pub(crate) mod testing;
