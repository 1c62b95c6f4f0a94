//! Research agent CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (run, feedback, prefs)
//! - `render`: Markdown and JSON report output

pub mod cli;
pub mod commands;
pub mod render;

pub use cli::{Cli, Commands, OutputFormat, PrefsCommands};
pub use commands::{handle_prefs, run_research, submit_feedback};
pub use render::{render_json, render_markdown};
