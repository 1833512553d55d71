//! Interactive session command.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Analyze(String),
    Generate(Option<u32>),
    Ask(Option<String>),
    Status,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => ReplCommand::Empty,
        "analyze" | "a" => ReplCommand::Analyze(rest.to_string()),
        "generate" | "g" => match rest {
            "" => ReplCommand::Generate(None),
            n => match n.parse() {
                Ok(n) => ReplCommand::Generate(Some(n)),
                Err(_) => ReplCommand::Unknown(line.to_string()),
            },
        },
        "ask" | "q" => ReplCommand::Ask((!rest.is_empty()).then(|| rest.to_string())),
        "status" => ReplCommand::Status,
        "help" | "?" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

fn print_help() {
    Output::kv("analyze <url>", "fetch and load a repository");
    Output::kv("generate [n]", "generate n Q&A pairs (5-20)");
    Output::kv("ask [topic]", "one focused question with its answer");
    Output::kv("status", "show the loaded repository");
    Output::kv("exit", "quit");
}

/// Run the interactive session.
pub async fn run_repl(settings: Settings) -> Result<()> {
    for warning in preflight::credential_warnings(&settings) {
        Output::warning(&warning);
    }

    let default_count = settings.qa.default_count;
    let mut session = Session::new(Orchestrator::new(settings)?);

    println!("\n{}", style("repoprep").bold().cyan());
    println!(
        "{}\n",
        style("Analyze a repository, then generate or ask. Type 'help' for commands, 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("repoprep>").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match parse_line(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Status => match session.repo() {
                Some(repo) => {
                    Output::kv("Repository", &repo.url);
                    Output::kv("Status", &repo.status());
                }
                None => Output::info("No repository loaded."),
            },
            ReplCommand::Analyze(url) => {
                let spinner = Output::spinner("Fetching repository...");
                let status = session.analyze(&url).await;
                spinner.finish_and_clear();

                if session.repo().is_some() {
                    Output::success(&status);
                } else {
                    Output::error(&status);
                }
            }
            ReplCommand::Generate(count) => {
                let spinner = Output::spinner("Generating Q&A...");
                let text = session.generate(count.unwrap_or(default_count)).await;
                spinner.finish_and_clear();
                Output::transcript(&text);
            }
            ReplCommand::Ask(topic) => {
                let spinner = Output::spinner("Thinking...");
                let text = session.ask(topic.as_deref()).await;
                spinner.finish_and_clear();
                Output::transcript(&text);
            }
            ReplCommand::Unknown(line) => {
                Output::warning(&format!("Unknown command: {}", line));
                print_help();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), ReplCommand::Empty);
        assert_eq!(
            parse_line("analyze https://github.com/a/b"),
            ReplCommand::Analyze("https://github.com/a/b".to_string())
        );
        assert_eq!(parse_line("analyze"), ReplCommand::Analyze(String::new()));
        assert_eq!(parse_line("generate"), ReplCommand::Generate(None));
        assert_eq!(parse_line("g 12"), ReplCommand::Generate(Some(12)));
        assert_eq!(
            parse_line("ask error handling in the server"),
            ReplCommand::Ask(Some("error handling in the server".to_string()))
        );
        assert_eq!(parse_line("ASK"), ReplCommand::Ask(None));
        assert_eq!(parse_line("quit"), ReplCommand::Exit);
    }

    #[test]
    fn test_parse_line_unknown() {
        assert_eq!(
            parse_line("generate lots"),
            ReplCommand::Unknown("generate lots".to_string())
        );
        assert_eq!(parse_line("dance"), ReplCommand::Unknown("dance".to_string()));
    }
}
