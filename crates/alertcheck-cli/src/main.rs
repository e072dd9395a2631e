//! alertcheck CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use alertcheck_cases::registry;
use alertcheck_cli::cli::{Cli, Commands};
use alertcheck_cli::commands::{ListCommand, RulesCommand, RunCommand};
use alertcheck_cli::output::OutputFormat;

const DEFAULT_FILTER: &str = "alertcheck=info";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command. Returns false if any test case failed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let format = OutputFormat::new(cli.format);
    let registry = registry().context("failed to build the test case registry")?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::List => {
            ListCommand::new(registry).execute(&mut stdout, &format)?;
        }
        Commands::Rules(args) => {
            RulesCommand::new(registry).execute(&mut stdout, &format, &args)?;
        }
        Commands::Run(args) => {
            let report = RunCommand::new(registry)
                .execute(&mut stdout, &format, &args)
                .await
                .with_context(|| format!("run with {} failed", args.config.display()))?;
            return Ok(report.passed());
        }
    }

    Ok(true)
}
