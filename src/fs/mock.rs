// src/fs/mock.rs

use super::{normalize_lexically, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    /// Child names.
    Dir(Vec<String>),
    /// Points at another absolute path; resolved by `canonicalize`.
    Symlink(PathBuf),
}

/// In-memory filesystem for tests.
///
/// Paths are expected to be absolute. `canonicalize` folds `.` / `..` and
/// follows symlinks registered with [`MockFileSystem::add_symlink`].
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        Self::ensure_dir_entry(&mut files, path);
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(link.as_ref(), MockEntry::Symlink(target.as_ref().to_path_buf()));
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.to_path_buf(), entry);

        // Parents are created implicitly.
        if let Some(parent) = path.parent() {
            Self::ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, path);
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            if parent != path {
                Self::ensure_dir_entry(files, parent);
                Self::link_child(files, parent, path);
            }
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    /// Follow symlinks for `path`, including symlinked ancestors.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let files = self.files.lock().unwrap();
        let mut current = normalize_lexically(path);

        // Bounded so a symlink loop cannot hang a test.
        for _ in 0..32 {
            let mut rewritten = None;
            for ancestor in current.ancestors() {
                if let Some(MockEntry::Symlink(target)) = files.get(ancestor) {
                    let rest = current.strip_prefix(ancestor).unwrap_or(Path::new(""));
                    rewritten = Some(normalize_lexically(&target.join(rest)));
                    break;
                }
            }
            match rewritten {
                Some(next) => current = next,
                None => {
                    return files.contains_key(&current).then_some(current);
                }
            }
        }
        None
    }

    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let resolved = self.resolve(path)?;
        let files = self.files.lock().unwrap();
        files.get(&resolved).cloned()
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.entry(path) {
            Some(MockEntry::File(content)) => Ok(content),
            Some(_) => Err(anyhow!("not a regular file: {path:?}")),
            None => Err(anyhow!("no such file: {path:?}")),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .ok_or_else(|| anyhow!("no such file: {path:?}"))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.entry(path) {
            Some(MockEntry::Dir(children)) => {
                let mut entries: Vec<PathBuf> =
                    children.iter().map(|name| path.join(name)).collect();
                entries.sort();
                Ok(entries)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
