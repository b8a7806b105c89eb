//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Contract document assembly: variant-driven clause selection and rendering
#[derive(Parser, Debug)]
#[command(name = "draftwork")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Fragment library root (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub fragments: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate agreements from request files
    Generate {
        /// Request files (JSON or TOML)
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        requests: Vec<PathBuf>,

        /// Output format (default from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write one file per request into this directory instead of stdout
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
    },

    /// Check a request without generating anything
    Validate {
        /// Request file
        #[arg(value_hint = ValueHint::FilePath)]
        request: PathBuf,
    },

    /// Print the template contexts of a request as JSON
    Context {
        /// Request file
        #[arg(value_hint = ValueHint::FilePath)]
        request: PathBuf,
    },

    /// List available fragment keys
    Fragments,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
