//! Dashboard API subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → server.rs (request id, trace span, timeout, body limit)
//!     → middleware.rs (per-route metrics)
//!     → node.rs | wallet.rs | send.rs handlers
//!         → session read at call time (wallet endpoints)
//!         → node / wallet queries, preview, pipeline
//!     → JSON body, or error.rs mapping to status + {"error": {...}}
//! ```

pub mod error;
pub mod middleware;
pub mod node;
pub mod send;
pub mod server;
pub mod wallet;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, HttpServer};
