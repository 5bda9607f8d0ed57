//! Audit engine for sve
//!
//! Coordinates rule evaluation across all requested services.

pub mod catalog;
pub mod common;
pub mod evaluate;
pub mod prereq;

use chrono::Utc;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::engine::catalog::{Catalog, RuleSet};
use crate::engine::common::ConfigText;
use crate::error::SveError;
use crate::report::{RunReport, ServiceReport, ServiceResult};

/// The main audit engine
pub struct AuditEngine {
    catalog: Catalog,
}

impl AuditEngine {
    /// Create a new engine over an already-validated catalog
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Run one audit pass over `services`, in the given order
    ///
    /// Each config file is read once, before any of its rules are
    /// evaluated. A service that cannot be audited yields a
    /// `ServiceResult::Error` and the remaining services still run.
    pub fn run(
        &self,
        services: &[String],
        config_paths: &BTreeMap<String, PathBuf>,
        versions: &BTreeMap<String, String>,
    ) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let results = services
            .iter()
            .map(|service| self.run_service(service, config_paths, versions))
            .collect();

        RunReport {
            started_at,
            elapsed: start.elapsed(),
            services: results,
        }
    }

    fn run_service(
        &self,
        service: &str,
        config_paths: &BTreeMap<String, PathBuf>,
        versions: &BTreeMap<String, String>,
    ) -> ServiceResult {
        let Some(rule_set) = self.catalog.get(service) else {
            let err = SveError::UnknownService(service.to_string());
            warn!(%service, "{}", err);
            return ServiceResult::Error {
                service: service.to_string(),
                config_path: None,
                message: err.to_string(),
            };
        };

        if rule_set.is_empty() {
            info!(%service, "no tests available, skipping");
            return ServiceResult::Skipped {
                service: service.to_string(),
            };
        }

        let Some(path) = config_paths.get(service) else {
            warn!(%service, "no config path known");
            return ServiceResult::Error {
                service: service.to_string(),
                config_path: None,
                message: format!("no config file path for service: {}", service),
            };
        };

        let text = match ConfigText::read(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(%service, "{}", e);
                return ServiceResult::Error {
                    service: service.to_string(),
                    config_path: Some(path.clone()),
                    message: e.to_string(),
                };
            }
        };

        let mut report = self.audit(rule_set, path.clone(), &text);
        report.version = versions.get(service).cloned();
        ServiceResult::Audited(report)
    }

    /// Evaluate every rule of a rule set, in catalog order
    pub fn audit(&self, rule_set: &RuleSet, config_path: PathBuf, text: &ConfigText) -> ServiceReport {
        let mut report = ServiceReport::new(rule_set.service.as_str(), config_path);

        for rule in &rule_set.rules {
            report.record(evaluate::evaluate(rule, &rule_set.templates, text));
        }

        info!(
            service = %rule_set.service,
            passed = report.passed,
            failed = report.failed,
            "service audited"
        );
        report
    }

    /// Audit config text directly, without touching the filesystem
    pub fn audit_text(&self, service: &str, text: &str) -> Result<ServiceReport, SveError> {
        let rule_set = self
            .catalog
            .get(service)
            .ok_or_else(|| SveError::UnknownService(service.to_string()))?;
        Ok(self.audit(rule_set, PathBuf::new(), &ConfigText::new(text)))
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
