// src/tasks/mod.rs

//! Task definitions derived from the configuration, and target resolution
//! (`build`, `lint`, user aliases, ...) into ordered task lists.

pub mod registry;

pub use registry::{Target, TaskDef, TaskRegistry};
