// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external tools
//! (compilers, linters, formatters, the live-reload server) using
//! `tokio::process::Command`.
//!
//! - [`backend`] provides the `ToolBackend` trait and the concrete
//!   `ShellBackend` that the runner uses in production, and which tests can
//!   replace with a fake implementation.
//! - [`task_runner`] handles individual tool process execution.
//! - [`long_lived`] keeps the serve-mode server process alive.

pub mod backend;
pub mod long_lived;
pub mod task_runner;

pub use backend::{Invocation, ShellBackend, ToolBackend, ToolOutcome};
pub use long_lived::LongLivedProcess;
