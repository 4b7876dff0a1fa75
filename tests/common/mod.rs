#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::Path;

pub use assetflow_test_utils::builders::{watcher, ConfigFileBuilder, FamilyConfigBuilder};
pub use assetflow_test_utils::fake_backend::FakeBackend;
pub use assetflow_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
