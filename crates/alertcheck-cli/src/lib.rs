//! # alertcheck-cli
//!
//! Command-line interface for the alerting-rule conformance suite.
//!
//! Provides commands for:
//! - Listing the registered test cases
//! - Emitting the rule file the system under test must load
//! - Running the suite and reporting per-case verdicts
//!
//! ```text
//! ┌────────────┐  remote write   ┌──────────────────────┐
//! │ alertcheck │────────────────►│                      │
//! │            │  /api/v1/alerts │   system under test  │
//! │            │◄────────────────│                      │
//! └────────────┘  /api/v1/query  └──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, RulesArgs, RunArgs};
pub use error::CliError;
pub use output::{OutputFormat, TableDisplay};
