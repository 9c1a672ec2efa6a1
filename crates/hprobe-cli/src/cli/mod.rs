//! CLI for hprobe, the HTTP header probe runner.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hprobe_core::config;
use hprobe_core::header_set::HeaderSet;
use hprobe_core::suite;
use std::path::PathBuf;

use commands::{run_list, run_suites, OutputMode};

/// Top-level CLI. With no subcommand every built-in suite runs.
#[derive(Debug, Parser)]
#[command(name = "hprobe")]
#[command(
    about = "hprobe: find which request header makes a streaming endpoint answer 403",
    long_about = None
)]
pub struct Cli {
    /// Endpoint to probe (default: target_url from config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Per-request timeout in seconds, replacing each suite's own.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print one JSON object per probe instead of the text report.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// HEAD requests over hand-picked header combinations.
    Combos,

    /// GET with a full browser header set, dropping (then isolating) one header at a time.
    Eliminate {
        /// Replace the base set: repeat `-H "Name: value"` per header.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,
    },

    /// Verbose streaming GETs: bare, full Chrome headers, UA + Range.
    Get,

    /// Run a suite defined in a TOML file.
    Run {
        /// Path to the suite file.
        path: PathBuf,
    },

    /// List built-in suites.
    List,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let url = cli.url.clone().unwrap_or_else(|| cfg.target_url.clone());
        let settings = cfg.run_settings(cli.timeout);
        let mode = if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let suites = match cli.command {
            None => suite::builtin(),
            Some(CliCommand::Combos) => vec![suite::combinations()],
            Some(CliCommand::Eliminate { headers }) => {
                let base = if headers.is_empty() {
                    suite::chrome_audio_headers()
                } else {
                    HeaderSet::parse_lines(&headers)?
                };
                vec![suite::elimination(&base)]
            }
            Some(CliCommand::Get) => vec![suite::get_requests()],
            Some(CliCommand::Run { path }) => vec![suite::load_suite(&path)?],
            Some(CliCommand::List) => return run_list(),
        };

        run_suites(&suites, &url, &settings, mode)
    }
}

#[cfg(test)]
mod tests;
