//! Compiled rule catalog
//!
//! Rules are data: every pattern is compiled and every prerequisite is
//! resolved against its template table when the catalog is built, so
//! evaluation never fails.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SveError};
use crate::rules::file::CatalogFile;
use crate::rules::{self, MatchFlags, PrereqKind, RuleKind, ServiceRules, TemplateTable};

/// Compile a catalog pattern with explicit flags
pub fn compile_pattern(pattern: &str, flags: MatchFlags) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .multi_line(flags.multi_line)
        .case_insensitive(flags.case_insensitive)
        .build()
}

/// A prerequisite reference on a compiled rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrereqRef {
    pub name: String,
    pub kind: PrereqKind,
}

/// A rule with its detection pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub description: String,
    pub kind: RuleKind,
    pub regex: Regex,
    pub prerequisites: Vec<PrereqRef>,
}

/// Name -> compiled pattern
#[derive(Debug, Clone, Default)]
pub struct Templates {
    patterns: HashMap<String, Regex>,
}

impl Templates {
    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The vulnerable and normal template tables of a service
#[derive(Debug, Clone, Default)]
pub struct TemplateTables {
    pub vulnerable: Templates,
    pub normal: Templates,
}

impl TemplateTables {
    pub fn table(&self, table: TemplateTable) -> &Templates {
        match table {
            TemplateTable::Vulnerable => &self.vulnerable,
            TemplateTable::Normal => &self.normal,
        }
    }

    fn table_mut(&mut self, table: TemplateTable) -> &mut Templates {
        match table {
            TemplateTable::Vulnerable => &mut self.vulnerable,
            TemplateTable::Normal => &mut self.normal,
        }
    }
}

/// Ordered rules plus template tables for one service
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub service: String,
    pub rules: Vec<CompiledRule>,
    pub templates: TemplateTables,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

/// Incrementally validates a service's rule set
#[derive(Debug)]
pub struct RuleSetBuilder {
    service: String,
    rules: Vec<CompiledRule>,
    templates: TemplateTables,
}

impl RuleSetBuilder {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            rules: Vec::new(),
            templates: TemplateTables::default(),
        }
    }

    pub fn template(
        &mut self,
        table: TemplateTable,
        name: &str,
        pattern: &str,
        flags: MatchFlags,
    ) -> Result<&mut Self> {
        let regex = self.compile(name, pattern, flags)?;
        let templates = self.templates.table_mut(table);
        if templates.contains(name) {
            return Err(SveError::DuplicateRule {
                service: self.service.clone(),
                name: name.to_string(),
            });
        }
        templates.patterns.insert(name.to_string(), regex);
        Ok(self)
    }

    pub fn rule(
        &mut self,
        name: &str,
        description: &str,
        kind: RuleKind,
        pattern: &str,
        flags: MatchFlags,
        prerequisites: Vec<PrereqRef>,
    ) -> Result<&mut Self> {
        if self.rules.iter().any(|r| r.name == name) {
            return Err(SveError::DuplicateRule {
                service: self.service.clone(),
                name: name.to_string(),
            });
        }
        let regex = self.compile(name, pattern, flags)?;
        self.rules.push(CompiledRule {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            regex,
            prerequisites,
        });
        Ok(self)
    }

    /// Check that every prerequisite names a template in its table
    pub fn build(self) -> Result<RuleSet> {
        for rule in &self.rules {
            for prereq in &rule.prerequisites {
                let table = prereq.kind.table();
                if !self.templates.table(table).contains(&prereq.name) {
                    return Err(SveError::MissingTemplate {
                        service: self.service.clone(),
                        rule: rule.name.clone(),
                        name: prereq.name.clone(),
                        table,
                    });
                }
            }
        }

        Ok(RuleSet {
            service: self.service,
            rules: self.rules,
            templates: self.templates,
        })
    }

    fn compile(&self, name: &str, pattern: &str, flags: MatchFlags) -> Result<Regex> {
        compile_pattern(pattern, flags).map_err(|source| SveError::InvalidPattern {
            service: self.service.clone(),
            name: name.to_string(),
            source,
        })
    }
}

/// Immutable per-service rule catalog, built once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rule_sets: Vec<RuleSet>,
}

impl Catalog {
    /// Compile the built-in ftp and ssh tables
    pub fn builtin() -> Result<Self> {
        Self::from_tables(&rules::builtin_services())
    }

    /// Compile static rule tables
    pub fn from_tables(tables: &[ServiceRules]) -> Result<Self> {
        let mut rule_sets = Vec::with_capacity(tables.len());

        for table in tables {
            let mut builder = RuleSetBuilder::new(table.service);
            for t in table.vuln_templates {
                builder.template(TemplateTable::Vulnerable, t.name, t.pattern, t.flags)?;
            }
            for t in table.norm_templates {
                builder.template(TemplateTable::Normal, t.name, t.pattern, t.flags)?;
            }
            for rule in table.rules {
                let prerequisites = rule
                    .prerequisites
                    .iter()
                    .map(|p| PrereqRef {
                        name: p.name.to_string(),
                        kind: p.kind,
                    })
                    .collect();
                builder.rule(
                    rule.name,
                    rule.description,
                    rule.kind,
                    rule.pattern,
                    rule.flags,
                    prerequisites,
                )?;
            }
            rule_sets.push(builder.build()?);
        }

        Self::from_rule_sets(rule_sets)
    }

    /// Load and compile an external catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = CatalogFile::from_file(path)?;
        Self::from_catalog_file(&file)
    }

    /// Compile a parsed catalog file
    pub fn from_catalog_file(file: &CatalogFile) -> Result<Self> {
        let mut rule_sets = Vec::with_capacity(file.services.len());

        for service in &file.services {
            let mut builder = RuleSetBuilder::new(service.name.as_str());
            for t in &service.vuln_templates {
                builder.template(TemplateTable::Vulnerable, &t.name, &t.pattern, t.flags())?;
            }
            for t in &service.norm_templates {
                builder.template(TemplateTable::Normal, &t.name, &t.pattern, t.flags())?;
            }
            for rule in &service.rules {
                let prerequisites = rule
                    .prerequisites
                    .iter()
                    .map(|p| PrereqRef {
                        name: p.name.clone(),
                        kind: p.kind,
                    })
                    .collect();
                builder.rule(
                    &rule.name,
                    &rule.description,
                    rule.kind,
                    &rule.pattern,
                    rule.flags(),
                    prerequisites,
                )?;
            }
            rule_sets.push(builder.build()?);
        }

        Self::from_rule_sets(rule_sets)
    }

    /// Assemble already-validated rule sets
    pub fn from_rule_sets(rule_sets: Vec<RuleSet>) -> Result<Self> {
        for (i, set) in rule_sets.iter().enumerate() {
            if rule_sets[..i].iter().any(|s| s.service == set.service) {
                return Err(SveError::DuplicateService(set.service.clone()));
            }
        }
        Ok(Self { rule_sets })
    }

    /// Look up a service's rule set
    pub fn get(&self, service: &str) -> Option<&RuleSet> {
        self.rule_sets.iter().find(|s| s.service == service)
    }

    /// Service identifiers in catalog order
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.rule_sets.iter().map(|s| s.service.as_str())
    }

    /// Number of services with at least one rule
    pub fn testable_count(&self) -> usize {
        self.rule_sets.iter().filter(|s| !s.is_empty()).count()
    }
}
