//! Audit results
//!
//! Outcomes are produced by the engine and handed to `output` for
//! rendering. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Supporting evidence for a failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub rule: String,
    pub description: String,

    /// Matched text, in match order
    pub matched: Vec<String>,

    /// The setting is absent and its insecure default is in effect
    pub implicit: bool,

    /// 1-based line numbers where the reporting pattern matched
    pub lines: Vec<usize>,
}

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EvaluationOutcome {
    Passed,
    Failed(Evidence),
}

impl EvaluationOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EvaluationOutcome::Failed(_))
    }

    pub fn status(&self) -> RuleStatus {
        match self {
            EvaluationOutcome::Passed => RuleStatus::Passed,
            EvaluationOutcome::Failed(_) => RuleStatus::Failed,
        }
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        match self {
            EvaluationOutcome::Passed => None,
            EvaluationOutcome::Failed(evidence) => Some(evidence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Passed,
    Failed,
}

/// Results for one audited service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub service: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub config_path: PathBuf,

    /// Status of every rule, in catalog order
    pub statuses: Vec<RuleStatus>,

    /// Failed rules only, in catalog order
    pub failures: Vec<Evidence>,

    pub passed: usize,
    pub failed: usize,
}

impl ServiceReport {
    pub fn new(service: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            service: service.into(),
            version: None,
            config_path: config_path.into(),
            statuses: Vec::new(),
            failures: Vec::new(),
            passed: 0,
            failed: 0,
        }
    }

    /// Record a rule outcome
    pub fn record(&mut self, outcome: EvaluationOutcome) {
        self.statuses.push(outcome.status());
        match outcome {
            EvaluationOutcome::Passed => self.passed += 1,
            EvaluationOutcome::Failed(evidence) => {
                self.failed += 1;
                self.failures.push(evidence);
            }
        }
    }

    /// Pass percentage, halves rounded to even; 100 when nothing failed
    pub fn percentage(&self) -> u32 {
        if self.failed == 0 {
            return 100;
        }
        let total = (self.passed + self.failed) as f64;
        (self.passed as f64 / total * 100.0).round_ties_even() as u32
    }
}

/// Result for one requested service
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ServiceResult {
    Audited(ServiceReport),

    /// No rules are registered for the service
    Skipped { service: String },

    /// The service could not be audited
    Error {
        service: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<PathBuf>,
        message: String,
    },
}

impl ServiceResult {
    pub fn service(&self) -> &str {
        match self {
            ServiceResult::Audited(report) => &report.service,
            ServiceResult::Skipped { service } => service,
            ServiceResult::Error { service, .. } => service,
        }
    }

    pub fn report(&self) -> Option<&ServiceReport> {
        match self {
            ServiceResult::Audited(report) => Some(report),
            _ => None,
        }
    }
}

/// One audit pass over the requested services
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,

    pub elapsed: Duration,

    /// Results keyed by request order
    pub services: Vec<ServiceResult>,
}

impl RunReport {
    pub fn get(&self, service: &str) -> Option<&ServiceResult> {
        self.services.iter().find(|s| s.service() == service)
    }

    pub fn audited(&self) -> impl Iterator<Item = &ServiceReport> {
        self.services.iter().filter_map(ServiceResult::report)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ServiceResult> {
        self.services
            .iter()
            .filter(|s| matches!(s, ServiceResult::Error { .. }))
    }

    pub fn passed(&self) -> usize {
        self.audited().map(|r| r.passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.audited().map(|r| r.failed).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}
