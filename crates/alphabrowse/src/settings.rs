use crate::prelude::*;
use alphabrowse_core::config::{load_config, Config};
use std::path::PathBuf;

/// Default configuration file location (`~/.config/alphabrowse/config.toml` on Linux)
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs_next::config_dir()
        .ok_or_else(|| eyre!("Could not determine the configuration directory"))?;

    Ok(config_dir.join("alphabrowse").join("config.toml"))
}

/// Load the configuration file and apply command line / environment overrides
pub fn load(global: &crate::Global) -> Result<Config> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    log::debug!("Loading configuration from {}", path.display());

    let config = load_config(&path)
        .map_err(Error::from)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    with_overrides(config, global.solr_url.clone(), global.timeout)
}

/// Apply CLI overrides to the configuration
pub fn with_overrides(
    mut config: Config,
    solr_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<Config> {
    if let Some(url) = solr_url {
        config.backend.url = url;
    }
    if let Some(timeout) = timeout_secs {
        config.backend.timeout_secs = timeout;
    }

    config.validate().map_err(Error::from)?;
    Ok(config)
}
