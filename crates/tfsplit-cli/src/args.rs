//! Command-line argument definitions for the tfsplit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`].

use clap::Parser;

/// Split a Terraform root module into independently deployable layers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Terraform root module to split
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Read the dependency graph from a file instead of running `terraform graph`
    #[arg(long)]
    pub graph_file: Option<String>,

    /// Write import blocks from this `terraform show -json` output
    #[arg(long)]
    pub state_file: Option<String>,

    /// Write import blocks from `terraform show -json` run in the module
    #[arg(long)]
    pub imports: bool,

    /// Terraform executable
    #[arg(long, default_value = "terraform")]
    pub terraform_bin: String,

    /// Print each layer's declarations without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the normalized dependency graph as DOT
    #[arg(long)]
    pub print_graph: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
