//! The active wallet selection.
//!
//! A single value, swapped atomically. Readers load it at call time, so a
//! call that started before a switch keeps the scope it read.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::rpc::WalletScope;

/// Currently selected wallet. Starts empty and never expires.
///
/// An empty name selects the node's default wallet; no selection at all is
/// a different state, reported by [`WalletSession::scope`] as `None`.
#[derive(Debug, Default)]
pub struct WalletSession {
    current: ArcSwapOption<String>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with `wallet` already selected (startup configuration).
    pub fn with_wallet(wallet: Option<String>) -> Self {
        Self {
            current: ArcSwapOption::from(wallet.map(Arc::new)),
        }
    }

    /// Select `name`. No check is made that the node has it loaded.
    pub fn set_current_wallet(&self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(wallet = %name, "Wallet selected");
        self.current.store(Some(Arc::new(name)));
    }

    pub fn clear(&self) {
        tracing::info!("Wallet selection cleared");
        self.current.store(None);
    }

    pub fn current_wallet(&self) -> Option<String> {
        self.current.load_full().map(|name| name.as_ref().clone())
    }

    /// Scope for wallet calls; `None` when nothing is selected.
    pub fn scope(&self) -> Option<WalletScope> {
        self.current
            .load()
            .as_deref()
            .map(|name| WalletScope::from_wallet(Some(name.as_str())))
    }
}
