//! Configuration file resolution.

use rigra_data::{DataConfig, DataError};
use std::path::{Path, PathBuf};

/// Default configuration file, `<config dir>/rigra/config.toml`.
pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rigra")
        .join("config.toml")
}

/// Load the configuration.
///
/// An explicitly given file must exist. Without one, the default location is
/// tried and a missing file yields the built-in defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<DataConfig, DataError> {
    let config = match path {
        Some(path) => {
            if !path.is_file() {
                return Err(DataError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            DataConfig::load_from(path)?
        }
        None => DataConfig::load_from(&default_config_path())?,
    };
    config.validate()?;
    Ok(config)
}
