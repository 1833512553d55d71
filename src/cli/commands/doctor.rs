//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{LlmProvider, Settings};
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&Path>) -> anyhow::Result<()> {
    Output::header("repoprep Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let sections = [
        ("External Tools", vec![check_git()]),
        ("Model Service", check_model_service(settings)),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    let mut checks = Vec::new();
    for (title, results) in sections {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    }

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using repoprep.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! repoprep is ready to use.");
    }

    Ok(())
}

/// Check that git is available.
fn check_git() -> CheckResult {
    match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok("git", &version)
        }
        Ok(_) => CheckResult::error("git", "installed but not working", install_hint_git()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error("git", "not found", install_hint_git())
        }
        Err(e) => CheckResult::error("git", &format!("error: {}", e), install_hint_git()),
    }
}

/// Check credentials and endpoint for the configured provider.
fn check_model_service(settings: &Settings) -> Vec<CheckResult> {
    let llm = &settings.llm;
    let key_var = match llm.provider {
        LlmProvider::Azure => "AZURE_OPENAI_API_KEY",
        LlmProvider::OpenAI => "OPENAI_API_KEY",
    };

    let mut results = vec![CheckResult::ok("Provider", &llm.provider.to_string())];

    match &llm.api_key {
        Some(key) if !key.is_empty() => {
            results.push(CheckResult::ok(key_var, &format!("configured ({})", mask_key(key))));
        }
        _ => results.push(CheckResult::error(
            key_var,
            "not set",
            &format!("Set with: export {}='...' (or put it in .env)", key_var),
        )),
    }

    if llm.provider == LlmProvider::Azure {
        if llm.endpoint.is_empty() {
            results.push(CheckResult::error(
                "AZURE_OPENAI_ENDPOINT",
                "not set",
                "Set with: export AZURE_OPENAI_ENDPOINT='https://<resource>.openai.azure.com'",
            ));
        } else {
            results.push(CheckResult::ok("AZURE_OPENAI_ENDPOINT", &llm.endpoint));
        }
        results.push(CheckResult::ok(
            "Deployments",
            &format!(
                "chat {}, embeddings {} (api {})",
                llm.deployment, settings.embedding.deployment, llm.api_version
            ),
        ));
    } else {
        results.push(CheckResult::ok(
            "Models",
            &format!("chat {}, embeddings {}", llm.deployment, settings.embedding.deployment),
        ));
    }

    results
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for (name, dir) in [
        ("Data directory", settings.data_dir()),
        ("Temp directory", settings.temp_dir()),
    ] {
        if dir.exists() {
            results.push(CheckResult::ok(name, &dir.display().to_string()));
        } else {
            results.push(CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            ));
        }
    }

    let index_dir = settings.index_dir();
    if index_dir.exists() {
        let size = dir_size(&index_dir);
        results.push(CheckResult::ok(
            "Indexes",
            &format!("{} ({})", index_dir.display(), format_size(size)),
        ));
    } else {
        results.push(CheckResult::ok(
            "Indexes",
            &format!("{} (none yet)", index_dir.display()),
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file(config_path: Option<&Path>) -> CheckResult {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: repoprep config edit",
        )
    }
}

/// Show the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Total size of the files under `dir`.
fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| match e.metadata() {
            Ok(m) if m.is_dir() => dir_size(&e.path()),
            Ok(m) => m.len(),
            Err(_) => 0,
        })
        .sum()
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for git.
fn install_hint_git() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: xcode-select --install (or brew install git)"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install git (or your package manager)"
    } else {
        "Install from: https://git-scm.com/downloads"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("abcd1234567890wxyz"), "abcd...wxyz");
    }

    #[test]
    fn test_model_service_missing_key() {
        let results = check_model_service(&Settings::default());
        assert!(results
            .iter()
            .any(|r| r.name == "AZURE_OPENAI_API_KEY" && r.status == CheckStatus::Error));
        assert!(results
            .iter()
            .any(|r| r.name == "AZURE_OPENAI_ENDPOINT" && r.status == CheckStatus::Error));
    }

    #[test]
    fn test_dir_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("sub/b"), [0u8; 5]).unwrap();
        assert_eq!(dir_size(dir.path()), 15);
    }
}
