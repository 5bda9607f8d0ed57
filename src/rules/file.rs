//! External rule catalog files
//!
//! A catalog file replaces the built-in rule tables. It is plain TOML,
//! one `[[service]]` block per service, compiled through the same
//! validation as the built-in catalog.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SveError};
use crate::rules::{MatchFlags, PrereqKind, RuleKind};

/// A prerequisite entry
#[derive(Debug, Clone, Deserialize)]
pub struct PrerequisiteEntry {
    pub name: String,
    pub kind: PrereqKind,
}

/// A rule entry
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    pub description: String,
    pub kind: RuleKind,
    pub pattern: String,

    #[serde(default)]
    pub case_insensitive: bool,

    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteEntry>,
}

impl RuleEntry {
    pub fn flags(&self) -> MatchFlags {
        flags_for(self.case_insensitive)
    }
}

/// A template entry
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub pattern: String,

    #[serde(default)]
    pub case_insensitive: bool,
}

impl TemplateEntry {
    pub fn flags(&self) -> MatchFlags {
        flags_for(self.case_insensitive)
    }
}

/// Rules and templates for one service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub name: String,

    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleEntry>,

    #[serde(default, rename = "vuln_template")]
    pub vuln_templates: Vec<TemplateEntry>,

    #[serde(default, rename = "norm_template")]
    pub norm_templates: Vec<TemplateEntry>,
}

/// The catalog file structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogFile {
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceEntry>,
}

impl CatalogFile {
    /// Read and parse a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SveError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SveError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn flags_for(case_insensitive: bool) -> MatchFlags {
    if case_insensitive {
        MatchFlags::CASE_INSENSITIVE
    } else {
        MatchFlags::DEFAULT
    }
}
