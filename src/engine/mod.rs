// src/engine/mod.rs

//! Orchestration engine for assetflow.
//!
//! This module ties together:
//! - the task registry (what a target expands to)
//! - the per-task file pipeline and its shared content cache
//! - the tool backend that actually runs commands
//! - the trigger queue used by serve mode (what happens when files change
//!   while tasks are running)
//!
//! The sequential task runner lives in [`runner`]; trigger coalescing in
//! [`queue`].

pub mod queue;
pub mod runner;

pub use queue::PendingTriggers;
pub use runner::{RunOptions, Runner, TaskReport};
