// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Parse a config file without semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&text)?)
}

/// Parse and validate a config file, rooting it at the file's directory.
///
/// Relative `src`, `dist` and `load_paths` entries, watch globs and the
/// working directory of every tool are all taken relative to that root, so
/// `assetflow --config web/assetflow.toml` behaves like running inside `web/`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let config = ConfigFile::try_from(load_from_path(path)?)?;
    let root = config_root_dir(path);
    debug!(config = ?path, root = ?root, "loaded configuration");
    Ok(config.with_root(root))
}

/// Directory holding `config_path`; the working directory for a bare file
/// name.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
