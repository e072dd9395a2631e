//! Name-keyed lookup of the available scenarios.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::case::TestCase;
use crate::error::{CaseError, Result};
use crate::scenarios;

/// Scenarios keyed by title.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    cases: BTreeMap<String, Arc<dyn TestCase>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in scenario.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::DuplicateCase` if two built-ins share a title.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for case in scenarios::builtin() {
            registry.register(case)?;
        }
        Ok(registry)
    }

    /// Registers a scenario under its title.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::DuplicateCase` if the title is already taken.
    pub fn register(&mut self, case: Arc<dyn TestCase>) -> Result<()> {
        let name = case.describe().title;
        if self.cases.contains_key(&name) {
            return Err(CaseError::DuplicateCase { name });
        }
        debug!(case = %name, "Registered test case");
        self.cases.insert(name, case);
        Ok(())
    }

    /// Looks up a scenario by title.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TestCase>> {
        self.cases.get(name).cloned()
    }

    /// Returns every registered title, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.cases.keys().map(String::as_str).collect()
    }

    /// Returns every registered scenario, sorted by title.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn TestCase>> {
        self.cases.values().cloned().collect()
    }

    /// Resolves a selection. An empty selection means every scenario.
    /// Repeated names resolve once, at their first position.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::UnknownCase` for the first name that isn't registered.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn TestCase>>> {
        if names.is_empty() {
            return Ok(self.all());
        }
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        names
            .iter()
            .filter(|name| seen.insert((*name).as_ref()))
            .map(|name| {
                self.get(name.as_ref()).ok_or_else(|| CaseError::UnknownCase {
                    name: name.as_ref().to_string(),
                })
            })
            .collect()
    }

    /// Returns the number of registered scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

static REGISTRY: Lazy<Result<Registry>> = Lazy::new(Registry::builtin);

/// The process-wide registry of built-in scenarios, built on first use and
/// read-only afterwards.
///
/// # Errors
///
/// Returns a copy of the error if the built-ins could not be registered.
pub fn registry() -> Result<&'static Registry> {
    REGISTRY.as_ref().map_err(|e| CaseError::construction(e.to_string()))
}
