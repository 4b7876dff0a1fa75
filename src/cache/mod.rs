// src/cache/mod.rs

//! Content cache used to skip files whose bytes have not changed.
//!
//! - [`fingerprint`] derives a content identity from file bytes.
//! - [`content`] holds the namespaced, mutex-guarded [`ContentCache`].
//!
//! The cache is an explicit object: construct one per process run, share it
//! through an `Arc`, and drop it at exit. Nothing here is global.

pub mod content;
pub mod fingerprint;

pub use content::{CacheEntry, CacheError, ContentCache};
pub use fingerprint::{fingerprint, Fingerprint};
