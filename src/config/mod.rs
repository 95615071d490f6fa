//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: node URL, RPC credentials)
//!     → validation.rs (semantic checks)
//!     → ConsoleConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - RPC credentials normally come from the environment, not the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ConsoleConfig;
pub use schema::FundsPolicy;
pub use schema::NodeConfig;
pub use schema::WalletConfig;
