//! Rule evaluation
//!
//! Evaluation is a pure function of a compiled rule, its service's
//! template tables and the config text.

use regex::Regex;
use tracing::debug;

use crate::engine::catalog::{CompiledRule, TemplateTables};
use crate::engine::common::{self, ConfigText};
use crate::engine::prereq;
use crate::report::{EvaluationOutcome, Evidence};
use crate::rules::RuleKind;

/// Whether the rule's own pattern puts it in the triggered state
pub fn is_triggered(rule: &CompiledRule, text: &ConfigText) -> bool {
    let found = rule.regex.is_match(text.as_str());
    match rule.kind {
        RuleKind::Default => !found,
        RuleKind::Explicit | RuleKind::SpecialRegex => found,
    }
}

/// Evaluate one rule against one config text
pub fn evaluate(rule: &CompiledRule, templates: &TemplateTables, text: &ConfigText) -> EvaluationOutcome {
    if !is_triggered(rule, text) {
        debug!(rule = %rule.name, "not triggered");
        return EvaluationOutcome::Passed;
    }

    if !prereq::resolve(&rule.prerequisites, templates, text) {
        debug!(rule = %rule.name, "triggered, prerequisites not met");
        return EvaluationOutcome::Passed;
    }

    let evidence = extract_evidence(rule, templates, text);
    debug!(rule = %rule.name, lines = ?evidence.lines, "failed");
    EvaluationOutcome::Failed(evidence)
}

fn extract_evidence(rule: &CompiledRule, templates: &TemplateTables, text: &ConfigText) -> Evidence {
    let haystack = text.as_str();

    let (reporting, matched, implicit): (&Regex, Vec<String>, bool) = match rule.kind {
        RuleKind::Default => match templates.vulnerable.get(&rule.name) {
            Some(template) => match template.find(haystack) {
                Some(m) => (template, vec![matched_text(m)], false),
                None => (template, vec![implicit_name(template, rule)], true),
            },
            None => (&rule.regex, vec![implicit_name(&rule.regex, rule)], true),
        },
        RuleKind::Explicit => {
            let matched = rule
                .regex
                .find(haystack)
                .map(matched_text)
                .into_iter()
                .collect();
            (&rule.regex, matched, false)
        }
        RuleKind::SpecialRegex => {
            let matched = rule
                .regex
                .find_iter(haystack)
                .map(matched_text)
                .collect();
            (&rule.regex, matched, false)
        }
    };

    Evidence {
        rule: rule.name.clone(),
        description: rule.description.clone(),
        matched,
        implicit,
        lines: common::matching_lines(reporting, text),
    }
}

/// Match text without the `\r` of CRLF line endings
fn matched_text(m: regex::Match<'_>) -> String {
    m.as_str().trim_end_matches('\r').to_string()
}

fn implicit_name(pattern: &Regex, rule: &CompiledRule) -> String {
    common::option_name(pattern.as_str())
        .unwrap_or(&rule.name)
        .to_string()
}
