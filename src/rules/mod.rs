//! Rule catalog data for sve
//!
//! Defines the rule model and the built-in per-service rule tables.

pub mod file;
pub mod ftp;
pub mod ssh;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trigger polarity of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Triggers when the pattern is present (an insecure option was set)
    Explicit,

    /// Triggers when the pattern is absent (the secure baseline is missing)
    Default,

    /// Like `Explicit`, but every match is collected as evidence
    SpecialRegex,
}

/// Which template table a prerequisite is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTable {
    Vulnerable,
    Normal,
}

impl fmt::Display for TemplateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateTable::Vulnerable => f.write_str("vulnerable"),
            TemplateTable::Normal => f.write_str("normal"),
        }
    }
}

/// Category of a prerequisite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrereqKind {
    /// The insecure default of another setting is in effect
    VulnerableDefault,

    /// Another setting is explicitly set to an insecure value
    VulnerableExplicit,

    /// A normal (non-vulnerable) setting is in effect
    NormalDefault,
}

impl PrereqKind {
    /// The template table this kind of prerequisite is resolved against
    pub fn table(&self) -> TemplateTable {
        match self {
            PrereqKind::VulnerableDefault | PrereqKind::VulnerableExplicit => {
                TemplateTable::Vulnerable
            }
            PrereqKind::NormalDefault => TemplateTable::Normal,
        }
    }
}

/// Regex options applied to a rule or template pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFlags {
    /// `^` and `$` match at line boundaries
    pub multi_line: bool,

    pub case_insensitive: bool,
}

impl MatchFlags {
    pub const DEFAULT: MatchFlags = MatchFlags {
        multi_line: true,
        case_insensitive: false,
    };

    pub const CASE_INSENSITIVE: MatchFlags = MatchFlags {
        multi_line: true,
        case_insensitive: true,
    };
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A named condition that must hold before a triggered rule is reported
#[derive(Debug, Clone, Copy)]
pub struct Prerequisite {
    pub name: &'static str,
    pub kind: PrereqKind,
}

impl Prerequisite {
    pub const fn new(name: &'static str, kind: PrereqKind) -> Self {
        Self { name, kind }
    }
}

/// A checkable configuration condition
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique name within the service's rule set
    pub name: &'static str,

    /// Human-readable explanation of the risk
    pub description: &'static str,

    pub kind: RuleKind,

    /// Line-anchored detection pattern
    pub pattern: &'static str,

    pub flags: MatchFlags,

    /// Conditions gating whether a triggered rule is reportable
    pub prerequisites: &'static [Prerequisite],
}

impl Rule {
    /// Create a new rule
    pub const fn new(
        name: &'static str,
        kind: RuleKind,
        pattern: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            pattern,
            flags: MatchFlags::DEFAULT,
            prerequisites: &[],
        }
    }

    /// Gate the rule on prerequisites
    pub const fn requires(mut self, prerequisites: &'static [Prerequisite]) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub const fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A pattern used only when its name appears as a prerequisite
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub pattern: &'static str,
    pub flags: MatchFlags,
}

impl Template {
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            flags: MatchFlags::DEFAULT,
        }
    }

    pub const fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Built-in rule tables for one service
#[derive(Debug, Clone, Copy)]
pub struct ServiceRules {
    pub service: &'static str,
    pub rules: &'static [Rule],
    pub vuln_templates: &'static [Template],
    pub norm_templates: &'static [Template],
}

/// All built-in services, in report order
pub fn builtin_services() -> [ServiceRules; 2] {
    [ftp::SERVICE, ssh::SERVICE]
}
