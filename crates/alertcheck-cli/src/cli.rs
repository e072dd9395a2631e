//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Conformance checks for alerting-rule evaluation.
#[derive(Parser, Debug, Clone)]
#[command(name = "alertcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List registered test cases.
    List,

    /// Print or write the rule file for a set of test cases.
    Rules(RulesArgs),

    /// Run test cases against a live system.
    Run(RunArgs),
}

/// Arguments for the rules command.
#[derive(Args, Debug, Clone, Default)]
pub struct RulesArgs {
    /// Test case to include (repeatable; all cases if omitted).
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<String>,

    /// Write the rule file here instead of printing it.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Driver configuration file (TOML).
    #[arg(short, long, env = "ALERTCHECK_CONFIG", value_name = "PATH")]
    pub config: PathBuf,

    /// Test case to run (repeatable; all cases if omitted).
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<String>,
}
