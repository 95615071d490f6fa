//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to node:
//!     → timeouts.rs (enforce per-call deadline)
//!     → On failure: surface to caller, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every node call has a deadline
//! - No automatic retries: wallet calls are not idempotent and a
//!   repeated broadcast must be an explicit user action

pub mod timeouts;
