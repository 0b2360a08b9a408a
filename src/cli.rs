// src/cli.rs

use casa_motility::types::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CASA motility analysis for tracked sperm trajectories
#[derive(Parser, Debug)]
#[command(name = "casa-motility")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `casa_motility=debug`. RUST_LOG takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze tracker output: one session per track file
    Analyze {
        /// Track file, or directory searched recursively (overrides input.dir)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Manually measured values (YAML or JSON) merged over tracking results
        #[arg(long)]
        clinical: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Directory for JSON reports (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include per-track results in JSON reports
        #[arg(long)]
        include_tracks: bool,
    },

    /// Check manually entered values against the reference table
    Check {
        /// Clinical values (YAML or JSON)
        input: PathBuf,

        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Console,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Console => OutputFormat::Console,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}
