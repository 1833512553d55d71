//! Repository text extraction.
//!
//! Walks a source tree, keeps allow-listed text files and concatenates them
//! into a single delimited corpus suitable for prompting or chunking.

mod tree;

pub use tree::{DiskTree, EntryKind, FileTree, MemoryTree, TreeEntry};

use crate::config::ExtractionSettings;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

/// Extensions treated as readable text/source.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "py", "ipynb", "md", "txt", "js", "ts", "tsx", "jsx", "java", "kt", "c", "cpp", "cs", "go",
    "rs", "rb", "php", "sql", "html", "css", "yml", "yaml", "toml", "ini", "json",
];

/// Directory names that are never descended into.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    "venv",
    ".venv",
    "__pycache__",
    ".next",
    ".cache",
    "target",
    "bin",
    "obj",
    ".idea",
    ".vscode",
];

/// Files larger than this many bytes are ignored.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 800_000;

/// Filtering rules for extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    allowed_extensions: HashSet<String>,
    skip_dirs: HashSet<String>,
    max_file_bytes: u64,
}

impl ExtractionRules {
    pub fn from_settings(settings: &ExtractionSettings) -> Self {
        Self {
            allowed_extensions: settings
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_dirs: settings.skip_dirs.iter().cloned().collect(),
            max_file_bytes: settings.max_file_bytes,
        }
    }

    /// Whether traversal should enter a directory with this name.
    pub fn should_descend(&self, name: &str) -> bool {
        !self.skip_dirs.contains(name)
    }

    /// Whether a file qualifies for the corpus, judged by path and size only.
    pub fn should_include(&self, path: &Path, size: u64) -> bool {
        if size > self.max_file_bytes {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.allowed_extensions.contains(&ext.to_lowercase()))
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::from_settings(&ExtractionSettings::default())
    }
}

/// One file included in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    pub text: String,
}

/// Ordered collection of the files that passed extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusDocument {
    files: Vec<CorpusFile>,
}

impl CorpusDocument {
    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Serialize to the delimited corpus string.
    ///
    /// Each file is introduced by a `=== FILE: <path> ===` header line and
    /// entries are separated by a blank line. Empty documents render to "".
    pub fn render(&self) -> String {
        self.files
            .iter()
            .map(|f| format!("\n{}\n{}", file_header(&f.path), f.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Header line that introduces a file in the corpus.
pub fn file_header(path: &str) -> String {
    format!("=== FILE: {} ===", path)
}

/// Walk `tree` and collect every qualifying file in deterministic order.
///
/// Entries are visited sorted by name; a directory's files come before its
/// subdirectories, which are walked depth-first. Skipped directories are never
/// listed. Read failures drop the file and continue.
#[instrument(skip_all)]
pub fn extract<T: FileTree + ?Sized>(tree: &T, rules: &ExtractionRules) -> CorpusDocument {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![PathBuf::new()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tree.list(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {:?}: {}", dir, e);
                continue;
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut subdirs = Vec::new();

        for entry in entries {
            let rel = dir.join(&entry.name);

            match entry.kind {
                EntryKind::Dir => {
                    if rules.should_descend(&entry.name) {
                        subdirs.push(rel);
                    } else {
                        debug!("Pruned {:?}", rel);
                    }
                }
                EntryKind::File => {
                    if !rules.should_include(&rel, entry.size) {
                        continue;
                    }

                    let bytes = match tree.read(&rel) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            debug!("Skipping unreadable file {:?}: {}", rel, e);
                            continue;
                        }
                    };

                    let text = decode_lossy(&bytes);
                    if text.trim().is_empty() {
                        continue;
                    }

                    files.push(CorpusFile {
                        path: to_slash_path(&rel),
                        text,
                    });
                }
            }
        }

        // Reverse so the stack pops subdirectories in name order
        pending.extend(subdirs.into_iter().rev());
    }

    info!("Extracted {} files", files.len());
    CorpusDocument { files }
}

/// Extract and render the corpus of an on-disk directory.
pub fn extract_text(root: &Path, rules: &ExtractionRules) -> String {
    extract(&DiskTree::new(root), rules).render()
}

/// Decode UTF-8, dropping invalid byte sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
