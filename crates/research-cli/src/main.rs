//! Research Agent
//!
//! Researches a topic on the web and prints a short, source-labelled report.
//!
//! # Usage
//!
//! ```bash
//! research-agent run <TOPIC...> [--format markdown|json] [--profile abstractive|extractive]
//! research-agent feedback <too-long|good|too-short>
//! research-agent prefs show|reset
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/research-agent/config.toml)
//! 3. Environment variables (RESEARCH_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use research_cli::{handle_prefs, run_research, submit_feedback, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            topic,
            format,
            profile,
        } => {
            run_research(
                cli.config.as_deref(),
                cli.log_level.as_deref(),
                &topic.join(" "),
                format,
                profile,
            )
            .await?;
        }
        Commands::Feedback { signal } => {
            submit_feedback(cli.config.as_deref(), cli.log_level.as_deref(), signal)?;
        }
        Commands::Prefs { command } => {
            handle_prefs(cli.config.as_deref(), cli.log_level.as_deref(), command)?;
        }
    }

    Ok(())
}
