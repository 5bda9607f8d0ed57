//! sve - service vulnerability enumerator
//!
//! Audits the plaintext configuration of service daemons (vsftpd, sshd)
//! against a catalog of known-insecure settings and reports which ones
//! are present, or dangerously absent, with the matching text and line
//! numbers as evidence.
//!
//! # Features
//!
//! - **Explicit rules**: an insecure option was set
//! - **Default rules**: the secure baseline is missing, so an insecure default applies
//! - **Prerequisites**: rules only count when the settings they depend on are in effect
//! - **External catalogs**: rule tables can be supplied as TOML
//! - **Text and JSON reports**
//!
//! # Example
//!
//! ```
//! use sve::{AuditEngine, Catalog};
//!
//! let engine = AuditEngine::new(Catalog::builtin().unwrap());
//!
//! let report = engine.audit_text("ftp", "anonymous_enable=YES\n").unwrap();
//! let failure = report.failures.iter().find(|f| f.rule == "anon enable").unwrap();
//! assert_eq!(failure.matched, vec!["anonymous_enable=YES"]);
//! assert_eq!(failure.lines, vec![1]);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod output;
pub mod report;
pub mod rules;

// Re-exports for convenience
pub use config::Config;
pub use engine::catalog::Catalog;
pub use engine::AuditEngine;
pub use error::{Result, SveError};
pub use report::{EvaluationOutcome, Evidence, RunReport, ServiceReport, ServiceResult};
