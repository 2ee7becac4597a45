use std::path::PathBuf;

use clap::{Parser, Subcommand};
use neonvibe_common::ProviderKind;

/// NeonVibe: generate multi-file web projects from a prompt, with a live
/// bundled preview.
#[derive(Parser, Debug)]
#[command(name = "neonvibe", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one generation turn and write the resulting project.
    Generate {
        /// What to build or change.
        prompt: String,

        /// Continue a saved session instead of starting a new one.
        #[arg(short, long)]
        session: Option<String>,

        /// Directory the project files and preview.html are written to.
        #[arg(short, long, default_value = "neonvibe-out")]
        out: PathBuf,

        /// Provider override (gemini, openrouter).
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ProviderKind>,

        /// Model override.
        #[arg(long)]
        model: Option<String>,
    },

    /// List saved sessions, newest first.
    Sessions,

    /// Print the transcript and file list of a saved session.
    Show { id: String },

    /// Delete a saved session.
    Delete { id: String },

    /// Export a saved session's files as a zip archive.
    Export {
        id: String,

        /// Archive path; defaults to `<id>.zip`.
        #[arg(long)]
        zip: Option<PathBuf>,
    },

    /// Print the effective configuration with secrets masked, optionally
    /// updating the `[ai]` section first.
    Config {
        /// Set the provider (gemini, openrouter).
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ProviderKind>,

        /// Set the model; an empty string selects the provider default.
        #[arg(long)]
        model: Option<String>,

        /// Set the API key.
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    value.parse()
}

pub fn parse() -> Args {
    Args::parse()
}
