//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the node console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Dashboard API listener.
    pub listener: ListenerConfig,

    /// Bitcoin node connection.
    pub node: NodeConfig,

    /// Timeout configuration for the dashboard API.
    pub timeouts: TimeoutConfig,

    /// Wallet session and send policy.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Bitcoin node JSON-RPC connection.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node RPC base URL.
    pub url: String,

    /// RPC username (HTTP Basic).
    pub rpc_user: String,

    /// RPC password (HTTP Basic). Never logged.
    pub rpc_password: String,

    /// Per-call deadline in seconds. Wallet rescans can block calls for a long time.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8332".to_string(),
            rpc_user: String::new(),
            rpc_password: String::new(),
            rpc_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("url", &self.url)
            .field("rpc_user", &self.rpc_user)
            .field("rpc_password", &"<redacted>")
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .finish()
    }
}

/// Timeout configuration for API requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Must exceed the node timeout so the API reports the node's failure.
    /// Advanced send and CPFP are exempt; each of their node calls is bounded
    /// by the node timeout instead.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Whether selected inputs must cover the requested outputs before a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FundsPolicy {
    /// Leave balance and fee checks to the node.
    #[default]
    Node,
    /// Reject drafts whose selected total is below the outputs total.
    RequireCoverage,
}

/// Wallet session and send settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Wallet selected at startup. Unset means no wallet selected.
    pub default_wallet: Option<String>,

    /// Transactions per history page.
    pub history_page_size: u32,

    /// Funds check applied before advanced sends.
    pub funds_policy: FundsPolicy,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            default_wallet: None,
            history_page_size: 5,
            funds_policy: FundsPolicy::Node,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "compact" or "pretty".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 256 * 1024, // 256KB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.node.rpc_timeout_secs, 30);
        assert_eq!(config.wallet.history_page_size, 5);
        assert_eq!(config.wallet.funds_policy, FundsPolicy::Node);
        assert!(config.wallet.default_wallet.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            [node]
            url = "http://10.0.0.2:18443"
            rpc_user = "alice"

            [wallet]
            funds_policy = "require-coverage"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.url, "http://10.0.0.2:18443");
        assert_eq!(config.node.rpc_user, "alice");
        assert_eq!(config.node.rpc_timeout_secs, 30);
        assert_eq!(config.wallet.funds_policy, FundsPolicy::RequireCoverage);
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut node = NodeConfig::default();
        node.rpc_password = "hunter2".to_string();
        let printed = format!("{:?}", node);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
