//! Integration tests for catalog loading and full audit runs

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use sve::rules::file::CatalogFile;
use sve::{AuditEngine, Catalog, EvaluationOutcome, ServiceResult, SveError};
use tempfile::{NamedTempFile, TempDir};

const MINIMAL: &str = r#"
[[service]]
name = "ftp"

[[service.rule]]
name = "anon upload"
description = "anonymous users may upload files"
kind = "explicit"
pattern = "^anon_upload_enable=YES"
prerequisites = [{ name = "anon enable", kind = "vulnerable-default" }]

[[service.rule]]
name = "anon enable"
description = "anonymous logins permitted"
kind = "default"
pattern = "^anonymous_enable=NO"

[[service.vuln_template]]
name = "anon enable"
pattern = "^anonymous_enable=YES"
"#;

fn catalog(toml: &str) -> Catalog {
    let file: CatalogFile = toml::from_str(toml).unwrap();
    Catalog::from_catalog_file(&file).unwrap()
}

fn outcome(config: &str, rule: &str) -> EvaluationOutcome {
    let catalog = catalog(MINIMAL);
    let rule_set = catalog.get("ftp").unwrap();
    let compiled = rule_set.rule(rule).unwrap();
    let text = sve::engine::common::ConfigText::new(config);
    sve::engine::evaluate::evaluate(compiled, &rule_set.templates, &text)
}

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_default_rule_fails_with_template_evidence() {
    let result = outcome("anonymous_enable=YES\nlocal_enable=YES\n", "anon enable");
    let evidence = result.evidence().unwrap();
    assert_eq!(evidence.matched, vec!["anonymous_enable=YES"]);
    assert_eq!(evidence.lines, vec![1]);
    assert!(!evidence.implicit);
}

#[test]
fn test_default_rule_passes_with_baseline() {
    let result = outcome("anonymous_enable=NO\n", "anon enable");
    assert!(matches!(result, EvaluationOutcome::Passed));
}

#[test]
fn test_explicit_rule_inert_without_prerequisite() {
    let result = outcome("anon_upload_enable=YES\nanonymous_enable=NO\n", "anon upload");
    assert!(matches!(result, EvaluationOutcome::Passed));
}

#[test]
fn test_explicit_rule_fails_with_prerequisite() {
    let result = outcome("anon_upload_enable=YES\nanonymous_enable=YES\n", "anon upload");
    let evidence = result.evidence().unwrap();
    assert_eq!(evidence.matched, vec!["anon_upload_enable=YES"]);
    assert_eq!(evidence.lines, vec![1]);
}

#[test]
fn test_evaluation_is_repeatable() {
    let config = "anon_upload_enable=YES\nanonymous_enable=YES\n";
    let first = outcome(config, "anon upload");
    let second = outcome(config, "anon upload");
    assert_eq!(first.evidence(), second.evidence());

    let engine = AuditEngine::new(catalog(MINIMAL));
    let a = engine.audit_text("ftp", config).unwrap();
    let b = engine.audit_text("ftp", config).unwrap();
    assert_eq!(a.statuses, b.statuses);
    assert_eq!(a.failures, b.failures);
}

// ============================================================================
// Prerequisites
// ============================================================================

const GATED: &str = r#"
[[service]]
name = "ssh"

[[service.rule]]
name = "empty root"
description = "root may log in with an empty password"
kind = "explicit"
pattern = "^PermitEmptyPasswords\\s+yes"
prerequisites = [
    { name = "password auth", kind = "vulnerable-default" },
    { name = "root login", kind = "vulnerable-explicit" },
]

[[service.vuln_template]]
name = "password auth"
pattern = "^PasswordAuthentication[ \\t]+yes"

[[service.vuln_template]]
name = "root login"
pattern = "^PermitRootLogin[ \\t]+yes"
"#;

#[test]
fn test_every_prerequisite_must_hold() {
    let engine = AuditEngine::new(catalog(GATED));

    let one = "PasswordAuthentication yes\nPermitEmptyPasswords yes\n";
    assert_eq!(engine.audit_text("ssh", one).unwrap().failed, 0);

    let other = "PermitRootLogin yes\nPermitEmptyPasswords yes\n";
    assert_eq!(engine.audit_text("ssh", other).unwrap().failed, 0);

    let both = "PasswordAuthentication yes\nPermitRootLogin yes\nPermitEmptyPasswords yes\n";
    let report = engine.audit_text("ssh", both).unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].lines, vec![3]);
}

#[test]
fn test_undeclared_template_rejected_at_load() {
    let toml = r#"
        [[service]]
        name = "ftp"

        [[service.rule]]
        name = "anon upload"
        description = "anonymous users may upload files"
        kind = "explicit"
        pattern = "^anon_upload_enable=YES"
        prerequisites = [{ name = "anon enable", kind = "vulnerable-default" }]
    "#;
    let file: CatalogFile = toml::from_str(toml).unwrap();
    assert!(matches!(
        Catalog::from_catalog_file(&file),
        Err(SveError::MissingTemplate { .. })
    ));
}

#[test]
fn test_malformed_pattern_rejected_at_load() {
    let toml = r#"
        [[service]]
        name = "ftp"

        [[service.rule]]
        name = "broken"
        description = "broken"
        kind = "explicit"
        pattern = "^(anon_upload_enable"
    "#;
    let file: CatalogFile = toml::from_str(toml).unwrap();
    assert!(matches!(
        Catalog::from_catalog_file(&file),
        Err(SveError::InvalidPattern { .. })
    ));
}

// ============================================================================
// Aggregation
// ============================================================================

fn ten_rule_catalog() -> String {
    let mut toml = String::from("[[service]]\nname = \"demo\"\n\n[[service]]\nname = \"ten\"\n");
    for i in 0..10 {
        toml.push_str(&format!(
            "\n[[service.rule]]\nname = \"opt{i}\"\ndescription = \"opt{i} enabled\"\nkind = \"explicit\"\npattern = \"^opt{i}=YES\"\n"
        ));
    }
    toml
}

#[test]
fn test_percentage_and_skipped_services() {
    let engine = AuditEngine::new(catalog(&ten_rule_catalog()));
    let config = write_file("opt0=YES\nopt1=NO\nopt2=YES\nopt3=YES\n");

    let services = vec!["demo".to_string(), "ten".to_string()];
    let mut paths = BTreeMap::new();
    paths.insert("ten".to_string(), config.path().to_path_buf());

    let run = engine.run(&services, &paths, &BTreeMap::new());
    assert!(matches!(run.get("demo"), Some(ServiceResult::Skipped { .. })));

    let report = run.get("ten").and_then(ServiceResult::report).unwrap();
    assert_eq!(report.failed, 3);
    assert_eq!(report.passed, 7);
    assert_eq!(report.percentage(), 70);

    // Skipped services add nothing to the totals
    assert_eq!(run.passed(), 7);
    assert_eq!(run.failed(), 3);
    assert_eq!(run.audited().count(), 1);
    assert_eq!(run.errors().count(), 0);
}

#[test]
fn test_results_follow_request_order() {
    let engine = AuditEngine::new(Catalog::builtin().unwrap());
    let ftp = write_file("anonymous_enable=NO\nftpd_banner=Hi\n");
    let ssh = write_file("PermitRootLogin no\nPasswordAuthentication no\n");

    let services = vec!["ssh".to_string(), "ftp".to_string()];
    let mut paths = BTreeMap::new();
    paths.insert("ftp".to_string(), ftp.path().to_path_buf());
    paths.insert("ssh".to_string(), ssh.path().to_path_buf());

    let run = engine.run(&services, &paths, &BTreeMap::new());
    let order: Vec<&str> = run.services.iter().map(|s| s.service()).collect();
    assert_eq!(order, vec!["ssh", "ftp"]);
    assert!(!run.has_failures());
    assert_eq!(run.passed(), 19 + 13);
}

// ============================================================================
// Files on disk
// ============================================================================

#[test]
fn test_external_catalog_file() {
    let file = write_file(MINIMAL);
    let catalog = Catalog::from_file(file.path()).unwrap();
    assert_eq!(catalog.services().collect::<Vec<_>>(), vec!["ftp"]);
    assert_eq!(catalog.testable_count(), 1);

    let engine = AuditEngine::new(catalog);
    let report = engine.audit_text("ftp", "anonymous_enable=YES\n").unwrap();
    assert_eq!(report.passed + report.failed, 2);
    assert_eq!(report.failures[0].rule, "anon enable");
}

#[test]
fn test_external_catalog_parse_error() {
    let file = write_file("[[service]]\nname = ");
    assert!(matches!(
        Catalog::from_file(file.path()),
        Err(SveError::ConfigParse { .. })
    ));
}

#[test]
fn test_unreadable_configs_reported_per_service() {
    let dir = TempDir::new().unwrap();
    let engine = AuditEngine::new(Catalog::builtin().unwrap());

    let services = vec!["ftp".to_string(), "ssh".to_string(), "apache".to_string()];
    let mut paths = BTreeMap::new();
    // A directory cannot be read as a config file
    paths.insert("ftp".to_string(), dir.path().to_path_buf());
    paths.insert("ssh".to_string(), PathBuf::from("/nonexistent/sshd_config"));

    let run = engine.run(&services, &paths, &BTreeMap::new());
    assert_eq!(run.services.len(), 3);
    assert_eq!(run.errors().count(), 3);
    assert_eq!(run.audited().count(), 0);

    match run.get("ssh") {
        Some(ServiceResult::Error { config_path, .. }) => {
            assert_eq!(config_path.as_deref(), Some(PathBuf::from("/nonexistent/sshd_config").as_path()));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
