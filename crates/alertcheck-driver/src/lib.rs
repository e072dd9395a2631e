//! Drives alerting-rule conformance scenarios against a live system.
//!
//! `alertcheck-driver` connects the scenarios in `alertcheck-cases` to a
//! Prometheus-compatible system under test:
//!
//! - **Rules**: Writes the combined rule file and optionally triggers a reload
//! - **Ingestion**: Pushes each scenario's timeline over remote write
//! - **Polling**: Reads alerts and the derived `ALERTS` metric on a fixed cadence
//!   and checks them against the scenario's acceptable states
//! - **Reporting**: Collects mismatches and fatal errors per scenario
//!
//! # Example
//!
//! ```rust,no_run
//! use alertcheck_cases::registry;
//! use alertcheck_driver::{Driver, DriverConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DriverConfig::from_file("alertcheck.toml")?;
//! let driver = Driver::from_config(&config)?;
//! let cases = registry()?.select::<&str>(&[])?;
//!
//! let report = driver.run(&cases).await?;
//! for case in &report.cases {
//!     println!("{} {}", case.verdict(), case.name);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/alertcheck-driver/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod http;
pub mod remote_write;
pub mod report;
pub mod transport;

// Re-export main types at crate root
pub use clock::{Clock, MonotonicClock, SystemClock};
pub use config::{DriverConfig, PollingConfig, RulesConfig};
pub use driver::{Driver, PollSettings, Transports};
pub use error::{DriverError, Result};
pub use http::{FileRuleLoader, QueryApiClient, RemoteWriteClient};
pub use report::{CaseReport, MismatchRecord, SuiteReport};
pub use transport::{AlertSource, Ingestor, RuleLoader, TransportFuture};
