//! briefly - Meeting transcripts in, summaries and action items out
//!
//! Entry point for the briefly CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use briefly::cli::commands::SummarizeOptions;
use briefly::cli::{Cli, Commands, ConfigCommand};
use briefly::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            briefly::cli::completions::print(shell);
        }
        Commands::Normalize { file } => {
            briefly::cli::commands::normalize_file(&file)?;
        }
        command => {
            // Load configuration only for commands that use it.
            let settings = match (&cli.config, &command) {
                (_, Commands::Config(ConfigCommand::Init { .. })) => Settings::default(),
                (Some(path), _) => Settings::load_explicit(path)?,
                (None, _) => Settings::load()?,
            };

            match command {
                Commands::Summarize {
                    files,
                    format,
                    output,
                    model,
                    title,
                } => {
                    briefly::cli::commands::summarize_files(
                        &settings,
                        SummarizeOptions {
                            files,
                            format,
                            output,
                            model,
                            title,
                        },
                    )
                    .await?;
                }
                Commands::Prompt { file } => {
                    briefly::cli::commands::show_prompt(&settings, &file)?;
                }
                Commands::Doctor { json } => {
                    briefly::cli::commands::run_doctor(&settings, json).await?;
                }
                Commands::Config(config_cmd) => {
                    briefly::cli::commands::config_command(
                        &settings,
                        cli.config.as_deref(),
                        config_cmd,
                    )?;
                }
                Commands::Completions { .. } | Commands::Normalize { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
