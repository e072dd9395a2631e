//! CLI command implementations.
//!
//! - [`list`] - Registered test cases
//! - [`rules`] - Rule file generation
//! - [`run`] - Suite execution against a live system

pub mod list;
pub mod rules;
pub mod run;

pub use list::ListCommand;
pub use rules::RulesCommand;
pub use run::RunCommand;
