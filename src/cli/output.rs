//! CLI output formatting utilities.

use chrono::{DateTime, Local, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a persisted index.
    pub fn index_info(url: &str, key: &str, chunks: usize, created_at: DateTime<Utc>) {
        println!(
            "  {} {} ({}, {} chunks, {})",
            style("*").cyan(),
            style(url).bold(),
            style(key).dim(),
            chunks,
            created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    /// Print model output, with `Q...:` lines emphasised.
    pub fn transcript(text: &str) {
        println!();
        for line in text.lines() {
            if is_question_line(line) {
                println!("{}", style(line).bold());
            } else {
                println!("{}", line);
            }
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// `Q:` or `Q<digits>:` at the start of a line.
fn is_question_line(line: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix('Q') else {
        return false;
    };
    rest.trim_start_matches(|c: char| c.is_ascii_digit()).starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_question_line() {
        assert!(is_question_line("Q1: Why tokio?"));
        assert!(is_question_line("Q: single"));
        assert!(is_question_line("  Q12: indented"));
        assert!(!is_question_line("A1: Because."));
        assert!(!is_question_line("Quick note: not a question"));
    }
}
