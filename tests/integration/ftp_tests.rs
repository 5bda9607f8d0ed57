//! Integration tests for the built-in vsftpd rules

use sve::{AuditEngine, Catalog, Evidence, ServiceReport};

fn audit(config: &str) -> ServiceReport {
    let engine = AuditEngine::new(Catalog::builtin().unwrap());
    engine.audit_text("ftp", config).unwrap()
}

fn failed_rules(config: &str) -> Vec<String> {
    audit(config).failures.into_iter().map(|f| f.rule).collect()
}

fn evidence(config: &str, rule: &str) -> Option<Evidence> {
    audit(config).failures.into_iter().find(|f| f.rule == rule)
}

const TYPICAL: &str = "\
anonymous_enable=NO
local_enable=YES
write_enable=YES
local_umask=022
dirmessage_enable=YES
xferlog_enable=YES
connect_from_port_20=YES
#chown_uploads=YES
#ftpd_banner=Welcome to blah FTP service.
listen=YES
";

// ============================================================================
// Typical configurations
// ============================================================================

#[test]
fn test_typical_config() {
    let report = audit(TYPICAL);
    assert_eq!(report.passed, 17);
    assert_eq!(report.failed, 2);
    assert_eq!(report.percentage(), 89);
    assert_eq!(failed_rules(TYPICAL), vec!["local umask", "banner"]);
}

#[test]
fn test_typical_config_evidence() {
    let umask = evidence(TYPICAL, "local umask").unwrap();
    assert_eq!(umask.matched, vec!["local_umask=022"]);
    assert_eq!(umask.lines, vec![4]);

    let banner = evidence(TYPICAL, "banner").unwrap();
    assert_eq!(banner.matched, vec!["#ftpd_banner=Welcome to blah FTP service."]);
    assert_eq!(banner.lines, vec![9]);
    assert!(!banner.implicit);
}

#[test]
fn test_hardened_config_passes() {
    let config = "anonymous_enable=NO\nlocal_enable=YES\nlocal_umask=077\nftpd_banner=Hello\n";
    let report = audit(config);
    assert_eq!(report.failed, 0);
    assert_eq!(report.percentage(), 100);
}

// ============================================================================
// Anonymous access
// ============================================================================

#[test]
fn test_anonymous_enabled_explicitly() {
    let config = "anonymous_enable=YES\nanon_upload_enable=YES\nanon_mkdir_write_enable=YES\n";
    let failed = failed_rules(config);

    // Catalog order, not file order
    let mkdir = failed.iter().position(|r| r == "anon mkdir").unwrap();
    let upload = failed.iter().position(|r| r == "anon upload").unwrap();
    let enable = failed.iter().position(|r| r == "anon enable").unwrap();
    assert!(mkdir < upload && upload < enable);

    let upload = evidence(config, "anon upload").unwrap();
    assert_eq!(upload.lines, vec![2]);
}

#[test]
fn test_anonymous_settings_inert_when_disabled() {
    let config = "anonymous_enable=NO\nanon_upload_enable=YES\nanon_other_write_enable=YES\nallow_anon_ssl=YES\n";
    let failed = failed_rules(config);
    assert!(!failed.contains(&"anon upload".to_string()));
    assert!(!failed.contains(&"anon write".to_string()));
    assert!(!failed.contains(&"anon ssl".to_string()));
    assert!(!failed.contains(&"anon enable".to_string()));
}

#[test]
fn test_commented_anonymous_enable_counts_as_enabled() {
    let config = "#anonymous_enable=NO\nanon_world_readable_only=NO\n";

    let enable = evidence(config, "anon enable").unwrap();
    assert_eq!(enable.matched, vec!["#anonymous_enable=NO"]);
    assert_eq!(enable.lines, vec![1]);

    let world_read = evidence(config, "anon world read").unwrap();
    assert_eq!(world_read.matched, vec!["anon_world_readable_only=NO"]);
    assert_eq!(world_read.lines, vec![2]);
}

#[test]
fn test_missing_anonymous_enable_is_implicit() {
    let enable = evidence("listen=YES\n", "anon enable").unwrap();
    assert!(enable.implicit);
    assert_eq!(enable.matched, vec!["anonymous_enable"]);
    assert!(enable.lines.is_empty());
}

// ============================================================================
// Local users
// ============================================================================

#[test]
fn test_umask_collects_every_occurrence() {
    let config = "local_enable=YES\nlocal_umask=022\nlocal_umask=002\n";
    let umask = evidence(config, "local umask").unwrap();
    assert_eq!(umask.matched, vec!["local_umask=022", "local_umask=002"]);
    assert_eq!(umask.lines, vec![2, 3]);
}

#[test]
fn test_chroot_requires_local_users() {
    let off = "anonymous_enable=NO\nlocal_enable=NO\nchroot_local_user=YES\n";
    assert!(evidence(off, "chroot local user").is_none());

    let on = "anonymous_enable=NO\nlocal_enable=YES\nchroot_local_user=YES\n";
    let chroot = evidence(on, "chroot local user").unwrap();
    assert_eq!(chroot.lines, vec![3]);
}

// ============================================================================
// Daemon options
// ============================================================================

#[test]
fn test_daemon_options_flagged() {
    let cases = [
        ("async_abor_enable=YES", "abor requests"),
        ("ls_recurse_enable=YES", "ls recursive"),
        ("no_log_lock=YES", "log lock"),
        ("one_process_model=YES", "one process model"),
        ("pasv_promiscuous=YES", "pasv promisc"),
        ("port_promiscuous=YES", "port promisc"),
        ("run_as_launching_user=YES", "launching user"),
        ("setproctitle_enable=YES", "proctitle"),
        ("ssl_enable=YES", "ssl enable"),
        ("virtual_use_local_privs=YES", "virtual privs"),
    ];

    for (line, rule) in cases {
        let config = format!("anonymous_enable=NO\nftpd_banner=Hi\n{}\n", line);
        let found = evidence(&config, rule)
            .unwrap_or_else(|| panic!("{} should be flagged by {}", line, rule));
        assert_eq!(found.matched, vec![line]);
        assert_eq!(found.lines, vec![3]);
    }
}

#[test]
fn test_options_must_start_the_line() {
    let config = "anonymous_enable=NO\nftpd_banner=Hi\n# pasv_promiscuous=YES\n  ssl_enable=YES\n";
    assert!(failed_rules(config).is_empty());
}
