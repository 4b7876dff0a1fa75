// src/pipeline/source.rs

use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, warn};

use crate::fs::{walk_files, FileSystem};
use crate::watch::path_utils::relative_str;

use super::FileRecord;

/// Compile a source glob (relative to the family `src` directory).
///
/// `*` does not cross `/`; use `**` for recursive matches.
pub fn build_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Read every file under `src` matching `pattern`, sorted by canonical path.
///
/// A missing `src` directory yields no files rather than an error, so a
/// family can be configured before its sources exist.
pub fn collect_sources(fs: &dyn FileSystem, src: &Path, pattern: &str) -> Result<Vec<FileRecord>> {
    if !fs.is_dir(src) {
        warn!(src = ?src, "source directory does not exist; no files to process");
        return Ok(Vec::new());
    }

    let matcher = build_matcher(pattern)?;
    let root = fs.canonicalize(src)?;
    let mut records = Vec::new();
    for path in walk_files(fs, &root)? {
        let Some(rel) = relative_str(&root, &path) else {
            continue;
        };
        if !matcher.is_match(&rel) {
            continue;
        }
        let canonical = fs.canonicalize(&path)?;
        let contents = fs.read(&path)?;
        records.push(FileRecord::new(canonical, rel, contents));
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    records.dedup_by(|a, b| a.path == b.path);
    debug!(src = ?root, pattern, files = records.len(), "collected sources");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::fs::mock::MockFileSystem;

    #[test]
    fn glob_is_relative_to_src() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/src/app.js", "a");
        fs.add_file("/p/src/lib/util.js", "u");
        fs.add_file("/p/src/lib/util.ts", "t");
        fs.add_file("/p/other.js", "o");

        let files = collect_sources(&fs, Path::new("/p/src"), "**/*.js").unwrap();
        let rel: Vec<_> = files.iter().map(|r| r.relative.to_string_lossy().into_owned()).collect();
        assert_eq!(rel, vec!["app.js", "lib/util.js"]);
        assert_eq!(&*files[1].contents, b"u");
    }

    #[test]
    fn top_level_only_glob() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/src/app.js", "a");
        fs.add_file("/p/src/lib/util.js", "u");

        let files = collect_sources(&fs, Path::new("/p/src"), "*.js").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("/p/src/app.js"));
    }

    #[test]
    fn missing_src_is_empty() {
        let fs = MockFileSystem::new();
        assert!(collect_sources(&fs, Path::new("/nope"), "**/*").unwrap().is_empty());
    }

    #[test]
    fn bad_glob_is_an_error() {
        assert!(build_matcher("[").is_err());
    }
}
