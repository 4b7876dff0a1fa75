// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::cache::CacheError;
use crate::graph::GraphBuildError;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in aliases: {0}")]
    AliasCycle(String),

    #[error("Task '{task}' failed (exit code {code})")]
    TaskFailed { task: String, code: i32 },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Graph(#[from] GraphBuildError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetflowError>;
