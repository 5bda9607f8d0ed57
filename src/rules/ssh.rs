//! sshd rules
//!
//! Option names follow sshd_config(5).

use crate::rules::{MatchFlags, PrereqKind, Prerequisite, Rule, RuleKind, ServiceRules, Template};

const PASSWORD_AUTH_ENABLED: &[Prerequisite] =
    &[Prerequisite::new("password auth", PrereqKind::VulnerableDefault)];

const ROOT_LOGIN_ENABLED: &[Prerequisite] =
    &[Prerequisite::new("root login", PrereqKind::VulnerableDefault)];

const PROTOCOL_2: &[Prerequisite] = &[Prerequisite::new("protocol 2", PrereqKind::NormalDefault)];

const USE_LOGIN_DISABLED: &[Prerequisite] =
    &[Prerequisite::new("use login no", PrereqKind::VulnerableExplicit)];

pub const RULES: &[Rule] = &[
    Rule::new(
        "accept env",
        RuleKind::Explicit,
        r"^AcceptEnv[ \t]+.*",
        "some environment variables copied into the session's environment can be used to bypass restricted user environments",
    ),
    // Authentication
    Rule::new(
        "password auth",
        RuleKind::Default,
        r"^PasswordAuthentication[ \t]+no\b",
        "password authentication is allowed. Prefer key authentication",
    ),
    Rule::new(
        "empty passwords",
        RuleKind::Explicit,
        r"^PermitEmptyPasswords[ \t]+yes\b",
        "login to accounts with empty passwords allowed",
    )
    .requires(PASSWORD_AUTH_ENABLED),
    Rule::new(
        "root login",
        RuleKind::Default,
        r"^PermitRootLogin[ \t]+no\b",
        "root login allowed",
    ),
    Rule::new(
        "root login no pass",
        RuleKind::Explicit,
        r"^PermitRootLogin[ \t]+without-password\b",
        "password authentication disabled for root",
    )
    .requires(ROOT_LOGIN_ENABLED),
    Rule::new(
        "permit user env",
        RuleKind::Explicit,
        r"^PermitUserEnvironment[ \t]+yes\b",
        "environment processing may enable users to bypass access restrictions in some configurations using mechanisms like LD_PRELOAD",
    ),
    // Protocol and session handling
    Rule::new(
        "protocol 1",
        RuleKind::Explicit,
        r"^Protocol[ \t]+1\b",
        "using protocol version 1",
    ),
    Rule::new(
        "pubkey auth",
        RuleKind::Explicit,
        r"^PubkeyAuthentication[ \t]+no\b",
        "public key authentication disabled",
    )
    .requires(PROTOCOL_2),
    Rule::new(
        "strict mode",
        RuleKind::Explicit,
        r"^StrictModes[ \t]+no\b",
        "checking file modes and ownership of users' files or home directory before accepting login disabled. This is desirable since novices sometimes leave their directory/files world-writable.",
    ),
    Rule::new(
        "tcp keepalive",
        RuleKind::Explicit,
        r"^TCPKeepAlive[ \t]+no\b",
        "sessions may hang indefinitely, leaving \"ghost\" users and consuming server resources",
    ),
    Rule::new(
        "use login",
        RuleKind::Explicit,
        r"^UseLogin[ \t]+yes\b",
        "login(1) is used for interactive login sessions",
    ),
    Rule::new(
        "no privilege separation",
        RuleKind::Explicit,
        r"^UsePrivilegeSeparation[ \t]+no\b",
        "privilege separation disabled",
    ),
    Rule::new(
        "x11 forwarding",
        RuleKind::Explicit,
        r"^X11Forwarding[ \t]+yes\b",
        "the client's X11 display server may be exposed to attack when the SSH client requests forwarding",
    )
    .requires(USE_LOGIN_DISABLED),
];

pub const VULN_TEMPLATES: &[Template] = &[
    Template::new("use login no", r"(^UseLogin[ \t]+no\b)|(^#+[ \t]*UseLogin[ \t]+no\b)"),
    Template::new(
        "root login",
        r"(^PermitRootLogin[ \t]+([^n\s]\S*|n[^o\s]\S*|no\S+))|(^#+[ \t]*PermitRootLogin[ \t]+.*)",
    ),
    Template::new(
        "password auth",
        r"(^PasswordAuthentication[ \t]+yes\b)|(^#+[ \t]*PasswordAuthentication[ \t]+.*)",
    ),
];

// sshd keywords are case-insensitive
pub const NORM_TEMPLATES: &[Template] = &[Template::new(
    "protocol 2",
    r"(^protocol[ \t]+(1,)?2(,1)?)|(^#*[ \t]*protocol[ \t]+(1,)?2(,1)?)",
)
.with_flags(MatchFlags::CASE_INSENSITIVE)];

pub const SERVICE: ServiceRules = ServiceRules {
    service: "ssh",
    rules: RULES,
    vuln_templates: VULN_TEMPLATES,
    norm_templates: NORM_TEMPLATES,
};
