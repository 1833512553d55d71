//! File tree abstraction used by the corpus extractor.
//!
//! Paths handed to a [`FileTree`] are relative to the tree root; the empty
//! path is the root itself.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A single entry returned by [`FileTree::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// File or directory name (last path component).
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

impl TreeEntry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
            size: 0,
        }
    }
}

/// Read-only view of a directory tree.
pub trait FileTree {
    /// List the immediate children of a directory. Order is unspecified.
    fn list(&self, dir: &Path) -> io::Result<Vec<TreeEntry>>;

    /// Read the raw bytes of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// A tree backed by the real filesystem.
///
/// Only regular files and directories are listed; symlinks are never
/// followed, so nothing outside the root is reachable.
pub struct DiskTree {
    root: PathBuf,
}

impl DiskTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileTree for DiskTree {
    fn list(&self, dir: &Path) -> io::Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(self.root.join(dir))? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();

            // Does not follow symlinks; links land in the final branch
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    debug!("Skipping {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            if file_type.is_dir() {
                entries.push(TreeEntry::dir(name));
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(meta) => entries.push(TreeEntry::file(name, meta.len())),
                    Err(e) => debug!("Skipping {:?}: {}", entry.path(), e),
                }
            } else {
                debug!("Skipping non-regular entry {:?}", entry.path());
            }
        }

        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

#[derive(Debug, Clone)]
enum MemoryFile {
    Content(Vec<u8>),
    Unreadable { size: u64 },
}

/// An in-memory tree, handy for exercising extraction rules without disk I/O.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, MemoryFile>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; intermediate directories are implied.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), MemoryFile::Content(content.into()));
        self
    }

    /// Add a file that reports `size` but fails on read.
    pub fn with_unreadable(mut self, path: impl AsRef<Path>, size: u64) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), MemoryFile::Unreadable { size });
        self
    }
}

impl FileTree for MemoryTree {
    fn list(&self, dir: &Path) -> io::Result<Vec<TreeEntry>> {
        let mut entries: BTreeMap<String, TreeEntry> = BTreeMap::new();

        for (path, file) in &self.files {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let name = first.as_os_str().to_string_lossy().into_owned();

            if components.next().is_some() {
                entries.entry(name.clone()).or_insert_with(|| TreeEntry::dir(name));
            } else {
                let size = match file {
                    MemoryFile::Content(bytes) => bytes.len() as u64,
                    MemoryFile::Unreadable { size } => *size,
                };
                entries.insert(name.clone(), TreeEntry::file(name, size));
            }
        }

        Ok(entries.into_values().collect())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.files.get(path) {
            Some(MemoryFile::Content(bytes)) => Ok(bytes.clone()),
            Some(MemoryFile::Unreadable { .. }) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "unreadable file",
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}
