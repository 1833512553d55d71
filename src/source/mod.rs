//! Repository retrieval.
//!
//! URLs are validated before any I/O. Clones land in a scoped temporary
//! directory that is removed when the returned guard drops.

mod git;

pub use git::GitFetcher;

use crate::error::{PrepError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Prefix of every temporary clone directory.
pub const TEMP_PREFIX: &str = ".tmp_repo_";

/// Retrieves a remote repository into a local directory.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    /// Shallow-fetch the default branch of `url` into the empty directory `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("Invalid regex"))
}

/// Trim `raw` and check it is an http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() || !scheme_pattern().is_match(url) {
        return Err(PrepError::Validation(url.to_string()));
    }

    let parsed = url::Url::parse(url).map_err(|_| PrepError::Validation(url.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(PrepError::Validation(url.to_string()));
    }

    Ok(url.to_string())
}

/// Create a fresh, uniquely named directory under `root` for one clone.
pub fn scratch_dir(root: &Path) -> Result<TempDir> {
    std::fs::create_dir_all(root)?;
    let dir = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir_in(root)?;
    Ok(dir)
}
