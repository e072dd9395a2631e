//! Expected-state models, verifiers and scenarios for alerting rule conformance.
//!
//! `alertcheck-cases` describes what a correct alerting-rule evaluator must
//! report while it processes a known input series. Each scenario supplies:
//!
//! - **A rule group**: The alerting rule the system under test loads
//! - **A timeline**: The input series, relative to zero time
//! - **A window plan**: Which alert states are acceptable at every elapsed time,
//!   with tolerance bands around each state change
//!
//! The driver binds a scenario to a zero time with [`ArmedCase::init`] and then
//! checks every poll against the acceptable set.
//!
//! # Example
//!
//! ```rust
//! use alertcheck_cases::{registry, ArmedCase, AlertPhase};
//!
//! let case = registry().unwrap().get("PendingAndFiringAndResolved").unwrap();
//! let zero = 1_700_000_000_000;
//! let armed = ArmedCase::init(case, zero);
//!
//! // Nothing is pending yet at zero time.
//! assert!(armed.check_alerts(zero, &[]).is_ok());
//!
//! // Four minutes in the alert must be pending.
//! let expectation = armed.expectation(zero + 240_000).unwrap();
//! assert_eq!(expectation.alternatives.len(), 1);
//! assert_eq!(expectation.alternatives[0].phase, AlertPhase::Pending);
//! ```
//!
//! # Rule files
//!
//! ```rust
//! use alertcheck_cases::{registry, RuleFile};
//!
//! let cases = registry().unwrap().select::<&str>(&[]).unwrap();
//! let file = RuleFile::from_cases(&cases).unwrap();
//! assert!(file.to_document().unwrap().contains("\"groups\""));
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/alertcheck-cases/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod case;
pub mod error;
pub mod model;
pub mod registry;
pub mod rule;
pub mod scenarios;
pub mod types;
pub mod verify;

// Re-export main types at crate root
pub use case::{ArmedCase, Description, TestCase, ALERTS_METRIC, RULE_GROUP_LABEL};
pub use error::{CaseError, MismatchError, Result};
pub use model::{
    AlertPhase, Alternative, Expectation, Region, StateWindow, Tolerance, Transition, WindowPlan,
};
pub use registry::{registry, Registry};
pub use rule::{format_duration, AlertingRule, AlertingRuleBuilder, RuleFile, RuleGroup};
pub use types::{
    ActiveSinceRange, AlertCondition, AlertState, ComparisonOperator, ExpectedAlert,
    ExpectedSample, InstantSample, ObservedAlert,
};
pub use verify::{check_alerts, check_metrics};
