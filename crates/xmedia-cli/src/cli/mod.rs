//! CLI for the xmedia capture engine: offline diagnostics over captured
//! response payloads.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use xmedia_core::config;

use commands::{run_best, run_scan};

/// Top-level CLI for the xmedia media extractor.
#[derive(Debug, Parser)]
#[command(name = "xmedia")]
#[command(about = "xmedia: media capture and correlation for platform API payloads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan a captured API response payload and print every media record.
    Scan {
        /// Path to a JSON payload file (e.g. saved from devtools).
        path: String,

        /// Override the configured traversal depth bound.
        #[arg(long, value_name = "N")]
        depth: Option<usize>,
    },

    /// Print the best-quality variant URL for one content id in a payload.
    Best {
        /// Path to a JSON payload file.
        path: String,

        /// Content id to resolve.
        id: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Scan { path, depth } => {
                run_scan(&path, depth.unwrap_or(cfg.max_scan_depth))
            }
            CliCommand::Best { path, id } => run_best(&path, &id, cfg.max_scan_depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> CliCommand {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn parse_scan_defaults() {
        match parse(&["xmedia", "scan", "payload.json"]) {
            CliCommand::Scan { path, depth } => {
                assert_eq!(path, "payload.json");
                assert!(depth.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_scan_with_depth() {
        match parse(&["xmedia", "scan", "payload.json", "--depth", "10"]) {
            CliCommand::Scan { depth, .. } => assert_eq!(depth, Some(10)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_best() {
        match parse(&["xmedia", "best", "payload.json", "42"]) {
            CliCommand::Best { path, id } => {
                assert_eq!(path, "payload.json");
                assert_eq!(id, "42");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["xmedia"]).is_err());
    }
}
