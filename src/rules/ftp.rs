//! vsftpd rules
//!
//! Option names follow vsftpd.conf(5).

use crate::rules::{PrereqKind, Prerequisite, Rule, RuleKind, ServiceRules, Template};

const ANON_ENABLED: &[Prerequisite] =
    &[Prerequisite::new("anon enable", PrereqKind::VulnerableDefault)];

const LOCAL_ENABLED: &[Prerequisite] =
    &[Prerequisite::new("local enable", PrereqKind::NormalDefault)];

pub const RULES: &[Rule] = &[
    // Anonymous access
    Rule::new(
        "anon ssl",
        RuleKind::Explicit,
        r"^allow_anon_ssl=YES",
        "anonymous users may connect using SSL connections",
    )
    .requires(ANON_ENABLED),
    Rule::new(
        "anon mkdir",
        RuleKind::Explicit,
        r"^anon_mkdir_write_enable=YES",
        "anonymous users may create directories",
    )
    .requires(ANON_ENABLED),
    Rule::new(
        "anon write",
        RuleKind::Explicit,
        r"^anon_other_write_enable=YES",
        "anonymous users may perform write operations (e.g., deletion, renaming, etc.)",
    )
    .requires(ANON_ENABLED),
    Rule::new(
        "anon upload",
        RuleKind::Explicit,
        r"^anon_upload_enable=YES",
        "anonymous users may upload files",
    )
    .requires(ANON_ENABLED),
    Rule::new(
        "anon world read",
        RuleKind::Explicit,
        r"^anon_world_readable_only=NO",
        "anonymous users may download files other than those that are world readable",
    )
    .requires(ANON_ENABLED),
    Rule::new(
        "anon enable",
        RuleKind::Default,
        r"^anonymous_enable=NO",
        "anonymous logins permitted",
    ),
    // Daemon behaviour
    Rule::new(
        "abor requests",
        RuleKind::Explicit,
        r"^async_abor_enable=YES",
        "async ABOR requests enabled",
    ),
    Rule::new(
        "chroot local user",
        RuleKind::Explicit,
        r"^chroot_local_user=YES",
        "local users are chrooted in their home directory",
    )
    .requires(LOCAL_ENABLED),
    Rule::new(
        "local umask",
        RuleKind::SpecialRegex,
        r"^local_umask=0[0-6][0-6]",
        "insufficient umask for local user-created files",
    )
    .requires(LOCAL_ENABLED),
    Rule::new(
        "ls recursive",
        RuleKind::Explicit,
        r"^ls_recurse_enable=YES",
        "recursive ls enabled (may consume a lot of resources)",
    ),
    Rule::new(
        "log lock",
        RuleKind::Explicit,
        r"^no_log_lock=YES",
        "vsftpd prevented from taking a file lock when writing to a file (this should generally not be enabled)",
    ),
    Rule::new(
        "one process model",
        RuleKind::Explicit,
        r"^one_process_model=YES",
        "using security model which only uses 1 process per connection",
    ),
    Rule::new(
        "pasv promisc",
        RuleKind::Explicit,
        r"^pasv_promiscuous=YES",
        "disabled PASV security check (which ensures data connection originates from the same IP as the control connection)",
    ),
    Rule::new(
        "port promisc",
        RuleKind::Explicit,
        r"^port_promiscuous=YES",
        "disabled PORT security check (ensures outgoing data connections can only connect to the client)",
    ),
    Rule::new(
        "launching user",
        RuleKind::Explicit,
        r"^run_as_launching_user=YES",
        "vsftpd runs as user which launched vsftpd (this should generally not be enabled)",
    ),
    Rule::new(
        "proctitle",
        RuleKind::Explicit,
        r"^setproctitle_enable=YES",
        "vsftpd shows session status information in system process listing",
    ),
    Rule::new(
        "ssl enable",
        RuleKind::Explicit,
        r"^ssl_enable=YES",
        "vsftpd can make no guarantees about the security of the OpenSSL libraries",
    ),
    Rule::new(
        "virtual privs",
        RuleKind::Explicit,
        r"^virtual_use_local_privs=YES",
        "virtual users have local user privileges",
    ),
    Rule::new(
        "banner",
        RuleKind::Default,
        r"(^ftpd_banner=.*)|(^banner_file=.*)",
        "banner shows version info",
    ),
];

pub const VULN_TEMPLATES: &[Template] = &[
    Template::new(
        "anon enable",
        r"(^anonymous_enable=YES)|(^#+[ \t]*anonymous_enable=.*)",
    ),
    Template::new(
        "banner",
        r"(^#+[ \t]*ftpd_banner=.*)|(^#+[ \t]*banner_file=.*)",
    ),
];

pub const NORM_TEMPLATES: &[Template] = &[Template::new(
    "local enable",
    r"(^local_enable=YES)|(^#+[ \t]*local_enable=.*)",
)];

pub const SERVICE: ServiceRules = ServiceRules {
    service: "ftp",
    rules: RULES,
    vuln_templates: VULN_TEMPLATES,
    norm_templates: NORM_TEMPLATES,
};
