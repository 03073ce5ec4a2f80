//! Server configuration read from the environment.

use std::path::Path;

use acnh_orders_queue::config::OrderConfig;
use tracing::info;

use crate::error::AppError;

/// Environment variable naming the YAML file with queue settings.
pub const ORDER_CONFIG_PATH_VAR: &str = "ORDER_CONFIG_PATH";

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// Reads `HOST` and `PORT`, defaulting to `0.0.0.0:3000`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is not a valid `u16`.
    pub fn from_env() -> Result<Self, AppError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        Ok(Self { host, port })
    }
}

/// Loads queue settings from the file named by `ORDER_CONFIG_PATH`, or the
/// defaults when the variable is unset.
///
/// # Errors
///
/// Returns `AppError` if the file cannot be read or parsed.
pub fn load_order_config() -> Result<OrderConfig, AppError> {
    match std::env::var(ORDER_CONFIG_PATH_VAR) {
        Ok(path) => read_order_config(Path::new(&path)),
        Err(_) => {
            info!("{ORDER_CONFIG_PATH_VAR} not set, using default queue settings");
            Ok(OrderConfig::default())
        }
    }
}

/// Reads queue settings from a YAML file.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read and
/// `AppError::Yaml` if it is not valid YAML for `OrderConfig`.
pub fn read_order_config(path: &Path) -> Result<OrderConfig, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let config = serde_yaml::from_str(&raw)?;
    info!(path = %path.display(), "loaded queue settings");
    Ok(config)
}
