//! Runs test cases against a live system.

use std::io::Write;

use alertcheck_cases::Registry;
use alertcheck_driver::{Driver, DriverConfig, SuiteReport};
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Run command executor.
pub struct RunCommand<'a> {
    registry: &'a Registry,
}

impl<'a> RunCommand<'a> {
    /// Create a run command over `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Execute the run command and return the suite report.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a case name is
    /// unknown, or the rule file cannot be loaded. Failing cases are not
    /// errors; check [`SuiteReport::passed`].
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &RunArgs,
    ) -> Result<SuiteReport, CliError> {
        let config = DriverConfig::from_file(&args.config)?;
        let cases = self.registry.select(&args.cases)?;
        info!(
            config = %args.config.display(),
            cases = cases.len(),
            remote_write = %config.remote_write_url,
            "Running suite"
        );

        let driver = Driver::from_config(&config)?;
        let report = driver.run(&cases).await?;
        format.write(writer, &report)?;
        Ok(report)
    }
}
