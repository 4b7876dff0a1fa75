// src/config/mod.rs

//! Configuration loading and validation for assetflow.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and its defaults (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate references, globs and alias cycles (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, FamilyConfig, RawConfigFile, ServerConfig, ToolConfig, WatcherConfig,
};
pub use validate::{enabled_tasks, validate_config};
