//! Wallet subsystem.
//!
//! # Data Flow
//! ```text
//! session.rs   selected wallet → WalletScope, read at call time
//! queries.rs   typed single-call reads and sends (sendtoaddress, bumpfee)
//! selection.rs client-side UTXO picks, resolved against listunspent
//! forms.rs     user input → validated draft / params, all errors at once
//! preview.rs   draft + listunspent → totals, implied fee, funds policy
//! pipeline.rs  draft → createrawtransaction → sign → sendrawtransaction
//! ```

pub mod forms;
pub mod model;
pub mod pipeline;
pub mod preview;
pub mod queries;
pub mod selection;
pub mod session;

pub use pipeline::{AdvancedSendPipeline, PipelineError, Stage};
pub use session::WalletSession;
