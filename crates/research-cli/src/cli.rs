//! CLI argument parsing for the research agent.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand, ValueEnum};
use research_types::{FeedbackSignal, PipelineProfile};

/// Research Agent
///
/// Searches the web, falls back to an encyclopedia, and condenses what it
/// finds into a short report with credibility-labelled sources.
#[derive(Parser, Debug)]
#[command(name = "research-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/research-agent/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and print the report
    Run {
        /// Topic to research (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Pipeline profile (abstractive, extractive)
        #[arg(short, long, value_parser = parse_profile)]
        profile: Option<PipelineProfile>,
    },

    /// Tell the agent whether the last summary had the right length
    Feedback {
        /// too-long, good or too-short
        #[arg(value_parser = parse_signal)]
        signal: FeedbackSignal,
    },

    /// Inspect or reset stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PrefsCommands {
    /// Print the current preference record
    Show,
    /// Delete the stored record so defaults apply again
    Reset,
}

fn parse_profile(s: &str) -> Result<PipelineProfile, String> {
    s.parse().map_err(|e: research_types::ResearchError| e.to_string())
}

fn parse_signal(s: &str) -> Result<FeedbackSignal, String> {
    s.parse().map_err(|e: research_types::ResearchError| e.to_string())
}
