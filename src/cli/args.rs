//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// briefly - Meeting transcripts in, summaries and action items out
#[derive(Parser, Debug)]
#[command(name = "briefly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize one or more transcript files (.txt, .vtt)
    Summarize {
        /// Transcript files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model name, overriding model.name
        #[arg(short, long)]
        model: Option<String>,

        /// Meeting title for the Markdown heading (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Print a transcript after cleaning
    Normalize {
        /// Transcript file
        file: PathBuf,
    },

    /// Print the exact prompt that would be sent to the model
    Prompt {
        /// Transcript file
        file: PathBuf,
    },

    /// Check that the model endpoint is reachable and the model installed
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Csv,
}
