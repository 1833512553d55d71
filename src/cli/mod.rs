//! CLI module for repoprep.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::ContextStrategy;
use clap::{Parser, Subcommand};

/// repoprep - interview Q&A from a code repository
///
/// Clones a repository, reads its text files and asks a language model for
/// interview questions and model answers grounded in that code.
#[derive(Parser, Debug)]
#[command(name = "repoprep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// How repository text reaches the model (direct, retrieval)
    #[arg(long, global = true)]
    pub strategy: Option<ContextStrategy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a repository and report what would be fed to the model
    Analyze {
        /// Repository URL (http or https)
        url: String,
    },

    /// Generate a batch of interview Q&A pairs for a repository
    Generate {
        /// Repository URL (http or https)
        url: String,

        /// Number of Q&A pairs (clamped to 5-20)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Write the Q&A to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate one focused interview question with its answer
    Ask {
        /// Repository URL (http or https)
        url: String,

        /// What the question should focus on
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// Start an interactive session (analyze once, ask many times)
    Repl,

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// List persisted retrieval indexes
    List,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API key masked)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
