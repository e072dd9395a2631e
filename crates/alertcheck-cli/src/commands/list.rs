//! Lists registered test cases.

use std::io::Write;

use alertcheck_cases::{format_duration, Registry};

use crate::error::CliError;
use crate::output::{CaseList, CaseSummary, OutputFormat};

/// List command executor.
pub struct ListCommand<'a> {
    registry: &'a Registry,
}

impl<'a> ListCommand<'a> {
    /// Create a list command over `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Summarize every registered case, sorted by name.
    #[must_use]
    pub fn cases(&self) -> CaseList {
        let cases = self
            .registry
            .all()
            .iter()
            .map(|case| {
                let description = case.describe();
                CaseSummary {
                    name: description.title,
                    description: description.description,
                    group: case.group_name().to_string(),
                    duration: format_duration(case.test_duration()),
                }
            })
            .collect();
        CaseList { cases }
    }

    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the output fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.write(writer, &self.cases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;

    #[test]
    fn lists_builtin_cases() {
        let registry = Registry::builtin().unwrap();
        let list = ListCommand::new(&registry).cases();

        assert_eq!(list.cases.len(), registry.len());
        let case = &list.cases[0];
        assert_eq!(case.name, "PendingAndFiringAndResolved");
        assert_eq!(case.group, "PendingAndFiringAndResolved");
        assert_eq!(case.duration, "26m");
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::new();
        let mut out = Vec::new();
        ListCommand::new(&registry)
            .execute(&mut out, &OutputFormat::new(Format::Table))
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No test cases registered"));
    }
}
