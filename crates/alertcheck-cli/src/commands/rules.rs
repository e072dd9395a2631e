//! Emits the rule file for a set of test cases.

use std::io::Write;

use alertcheck_cases::{Registry, RuleFile};
use tracing::info;

use crate::cli::RulesArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, RulesWritten};

/// Rules command executor.
pub struct RulesCommand<'a> {
    registry: &'a Registry,
}

impl<'a> RulesCommand<'a> {
    /// Create a rules command over `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Build the combined rule file for the selected cases.
    ///
    /// # Errors
    ///
    /// Returns an error if a case name is unknown or a rule group is invalid.
    pub fn rule_file(&self, cases: &[String]) -> Result<RuleFile, CliError> {
        let selected = self.registry.select(cases)?;
        Ok(RuleFile::from_cases(&selected)?)
    }

    /// Execute the rules command.
    ///
    /// Without `--output` the document itself is printed, whatever the
    /// output format.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule file cannot be built or written.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &RulesArgs,
    ) -> Result<(), CliError> {
        let rules = self.rule_file(&args.cases)?;
        let document = rules.to_document()?;

        let Some(path) = &args.output else {
            writeln!(writer, "{document}")?;
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, document)?;
        info!(path = %path.display(), groups = rules.groups.len(), "Rule file written");

        format.write(
            writer,
            &RulesWritten {
                path: path.display().to_string(),
                groups: rules.groups.len(),
                rules: rules.rule_count(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use alertcheck_cases::CaseError;

    fn registry() -> Registry {
        Registry::builtin().unwrap()
    }

    #[test]
    fn prints_document_without_output() {
        let registry = registry();
        let mut out = Vec::new();
        RulesCommand::new(&registry)
            .execute(&mut out, &OutputFormat::default(), &RulesArgs::default())
            .unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["groups"][0]["name"], "PendingAndFiringAndResolved");
        assert_eq!(doc["groups"][0]["rules"][0]["for"], "3m");
    }

    #[test]
    fn writes_document_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rules.json");
        let args = RulesArgs {
            cases: vec!["PendingAndFiringAndResolved".to_string()],
            output: Some(path.clone()),
        };

        let registry = registry();
        let mut out = Vec::new();
        RulesCommand::new(&registry)
            .execute(&mut out, &OutputFormat::new(Format::Json), &args)
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["groups"][0]["interval"], "30s");

        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["groups"], 1);
        assert_eq!(summary["rules"], 1);
    }

    #[test]
    fn unknown_case_fails() {
        let registry = registry();
        let err = RulesCommand::new(&registry)
            .rule_file(&["NoSuchCase".to_string()])
            .unwrap_err();
        assert!(matches!(err, CliError::Case(CaseError::UnknownCase { .. })));
    }
}
