//! CLI argument definitions for the screening package validator.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use nyher_validate::BindingProfile;

#[derive(Parser)]
#[command(
    name = "nyher-validate",
    version,
    about = "Validate NYHER screening CSV packages against a data package spec",
    long_about = "Validate a batch of screening CSV files against a JSON data package spec.\n\n\
                  Files are bound to the spec's resources by position (three, four or seven\n\
                  files) or discovered in a directory by file name prefix. A trailing\n\
                  argument ending in .json names the output file; without it the report\n\
                  is printed to stdout."
)]
pub struct Cli {
    /// Path to the data package spec (JSON).
    #[arg(value_name = "SPEC_PATH")]
    pub spec_path: Option<PathBuf>,

    /// Input CSV files in profile order, optionally followed by the output path.
    #[arg(value_name = "FILES", num_args = 0..)]
    pub args: Vec<PathBuf>,

    /// Binding profile (default: chosen from the number of files).
    #[arg(long, value_parser = parse_profile)]
    pub profile: Option<BindingProfile>,

    /// Discover input files in DIR by file name prefix instead of by position.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Rule configuration (JSON) replacing the built-in screening rules.
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Leave the raw rows out of the report.
    #[arg(long = "no-original-data")]
    pub no_original_data: bool,

    /// Print a per-file summary of findings to stderr.
    #[arg(long)]
    pub summary: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Allow row values in trace logs. They may contain PHI.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

fn parse_profile(value: &str) -> Result<BindingProfile, String> {
    value.parse().map_err(|err: nyher_validate::BindingError| err.to_string())
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
