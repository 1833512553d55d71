//! Shallow clones through the `git` binary.

use super::RepoFetcher;
use crate::error::{PrepError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fetches repositories with `git clone --depth 1`.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: String,
}

impl GitFetcher {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoFetcher for GitFetcher {
    #[instrument(skip(self, dest), fields(url = %url))]
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Cloning {}", url);

        let result = Command::new(&self.program)
            .arg("clone")
            .arg("--depth").arg("1")
            .arg("--quiet")
            .arg(url)
            .arg(dest)
            // Fail instead of prompting for credentials
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PrepError::ToolNotFound(self.program.clone()));
            }
            Err(e) => {
                return Err(PrepError::Fetch(format!("git execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrepError::Fetch(format!("git clone failed: {}", stderr.trim())));
        }

        debug!("Cloned into {:?}", dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_git_binary() {
        let dest = tempfile::tempdir().unwrap();
        let fetcher = GitFetcher::with_program("repoprep-no-such-git");
        let err = tokio_test::assert_err!(fetcher.fetch("https://example.com/repo", dest.path()).await);
        assert!(matches!(err, PrepError::ToolNotFound(ref p) if p == "repoprep-no-such-git"));
    }
}
