//! CLI argument parsing for reportpatch

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about = "Apply ordered, anchor-checked patches to the report template", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available patch sets
    List,

    /// Show the patches of a set in order
    Show {
        /// Patch set name or path to a YAML set
        #[arg(required = true)]
        set: String,
    },

    /// Apply one or more patch sets to the template
    Apply {
        /// Patch set names or YAML paths, applied in the order given
        #[arg(required = true)]
        sets: Vec<String>,

        /// Template file to patch (default: from config)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Run every patch but write nothing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print a unified diff of the change
        #[arg(short, long)]
        diff: bool,
    },

    /// Report which anchors of a set are present in the template
    Check {
        /// Patch set name or path to a YAML set
        #[arg(required = true)]
        set: String,

        /// Template file to check (default: from config)
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
}
