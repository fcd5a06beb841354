//! TOML configuration files.

use std::path::Path;

use crate::domain::PretreatConfig;
use crate::error::AppError;

/// Load a config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<PretreatConfig, AppError> {
    let Some(path) = path else {
        return Ok(PretreatConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    let config: PretreatConfig = toml::from_str(&text)
        .map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))?;
    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}
