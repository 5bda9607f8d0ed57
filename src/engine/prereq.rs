//! Prerequisite resolution
//!
//! A triggered rule is only reported when every prerequisite it declares
//! matches its template (conjunctive semantics).

use tracing::debug;

use crate::engine::catalog::{PrereqRef, TemplateTables};
use crate::engine::common::ConfigText;

/// Decide whether all prerequisites hold against the config text
///
/// An empty list needs no gating and is satisfied. Scanning stops at the
/// first unmet prerequisite.
pub fn resolve(prerequisites: &[PrereqRef], templates: &TemplateTables, text: &ConfigText) -> bool {
    prerequisites.iter().all(|prereq| {
        let table = prereq.kind.table();
        let met = templates
            .table(table)
            .get(&prereq.name)
            .is_some_and(|re| re.is_match(text.as_str()));
        debug!(prereq = %prereq.name, %table, met, "prerequisite checked");
        met
    })
}
