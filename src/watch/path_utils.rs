// src/watch/path_utils.rs

//! Utility functions for relating event and source paths to a root.

use std::path::Path;

use crate::fs::FileSystem;

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// A direct `strip_prefix(root)` is tried first. Returns `None` if `path` is
/// not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(to_slash)
}

/// Like [`relative_str`], but when the direct prefix check fails both paths
/// are canonicalised through `fs` and compared again. Watch events on some
/// platforms (notably macOS, `/private/var/...`) arrive under a different
/// absolute prefix than the one that was watched.
///
/// A path that no longer exists (deleted file) cannot be canonicalised, so
/// its parent directory is canonicalised instead.
pub fn relative_str_resolved(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Some(rel) = relative_str(root, path) {
        return Some(rel);
    }

    let root_canon = fs.canonicalize(root).ok()?;
    let path_canon = match fs.canonicalize(path) {
        Ok(p) => p,
        Err(_) => {
            let parent = fs.canonicalize(path.parent()?).ok()?;
            parent.join(path.file_name()?)
        }
    };
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn direct_prefix() {
        assert_eq!(
            relative_str(Path::new("/p"), Path::new("/p/src/a.scss")).as_deref(),
            Some("src/a.scss")
        );
        assert_eq!(relative_str(Path::new("/p"), Path::new("/q/a.scss")), None);
    }

    #[test]
    fn resolves_symlinked_prefixes_and_deleted_files() {
        let fs = MockFileSystem::new();
        fs.add_dir("/private/var/p/src");
        fs.add_file("/private/var/p/src/a.scss", "");
        fs.add_symlink("/var", "/private/var");

        assert_eq!(
            relative_str_resolved(&fs, Path::new("/var/p"), Path::new("/private/var/p/src/a.scss")).as_deref(),
            Some("src/a.scss")
        );
        assert_eq!(
            relative_str_resolved(&fs, Path::new("/var/p"), Path::new("/private/var/p/src/gone.scss")).as_deref(),
            Some("src/gone.scss")
        );
    }
}
