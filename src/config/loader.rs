//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ConsoleConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Node RPC base URL.
pub const NODE_URL_ENV_VAR: &str = "BITCOIN_RPC_URL";
/// Node RPC username.
pub const RPC_USER_ENV_VAR: &str = "BITCOIN_RPC_USER";
/// Node RPC password.
pub const RPC_PASSWORD_ENV_VAR: &str = "BITCOIN_RPC_PASSWORD";
/// Dashboard API bind address.
pub const BIND_ENV_VAR: &str = "NODE_CONSOLE_BIND";
/// Wallet selected at startup.
pub const WALLET_ENV_VAR: &str = "NODE_CONSOLE_WALLET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: optional file, then environment
/// overrides, then validation.
pub fn load_effective_config(path: Option<&Path>) -> Result<ConsoleConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ConsoleConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` is usually `std::env::var`; tests pass a map. Empty values are
/// ignored, except for the wallet where an empty name selects the default
/// wallet.
pub fn apply_env_overrides<F>(config: &mut ConsoleConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = non_empty(NODE_URL_ENV_VAR) {
        config.node.url = url;
    }
    if let Some(user) = non_empty(RPC_USER_ENV_VAR) {
        config.node.rpc_user = user;
    }
    if let Some(password) = non_empty(RPC_PASSWORD_ENV_VAR) {
        config.node.rpc_password = password;
    }
    if let Some(bind) = non_empty(BIND_ENV_VAR) {
        config.listener.bind_address = bind;
    }
    if let Some(wallet) = lookup(WALLET_ENV_VAR) {
        config.wallet.default_wallet = Some(wallet);
    }
}

fn read_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}
